use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Version,
    Devices,
    State,
    SerialNo,
    Shell(Vec<String>),
    Pull { remote: String, local: String },
    Push { local: String, remote: String },
    Reboot(String),
    Find(String),
    StartServer,
    KillServer,
    RestartServer,
    Help,
}

#[derive(Debug)]
pub struct Args {
    pub adb_path: Option<String>,
    pub device: Option<String>,
    pub auto_select: bool,
    pub debug_mode: bool,
    pub command: Command,
}

impl Args {
    pub fn parse() -> Option<Self> {
        let args: Vec<String> = env::args().skip(1).collect();
        Self::parse_from(&args)
    }

    pub fn parse_from(args: &[String]) -> Option<Self> {
        let mut adb_path: Option<String> = None;
        let mut device: Option<String> = None;
        let mut auto_select = true;
        let mut debug_mode = false;

        let mut iter = args.iter();
        let mut rest: Vec<String> = Vec::new();
        for arg in iter.by_ref() {
            if arg == "--help" || arg == "-h" {
                print_help();
                return None;
            } else if arg == "--version" || arg == "-v" {
                println!("Android ADB Bridge v{}", env!("APP_VERSION_DISPLAY"));
                return None;
            } else if arg == "--debug" {
                debug_mode = true;
            } else if arg == "--no-auto-select" {
                auto_select = false;
            } else if let Some(val) = arg.strip_prefix("--adb=") {
                adb_path = Some(val.to_string());
            } else if let Some(val) = arg.strip_prefix("--device=") {
                device = Some(val.to_string());
            } else if arg.starts_with("--") {
                eprintln!("❌ Unknown argument: {}", arg);
                print_help();
                return None;
            } else {
                rest.push(arg.clone());
                break;
            }
        }
        rest.extend(iter.cloned());

        let command = match parse_command(&rest) {
            Ok(command) => command,
            Err(msg) => {
                eprintln!("❌ {}", msg);
                print_help();
                return None;
            }
        };

        Some(Args {
            adb_path,
            device,
            auto_select,
            debug_mode,
            command,
        })
    }
}

fn parse_command(words: &[String]) -> Result<Command, String> {
    let Some((name, params)) = words.split_first() else {
        return Err("Missing command".to_string());
    };
    let arity = |n: usize| {
        if params.len() == n {
            Ok(())
        } else {
            Err(format!("'{name}' expects {n} argument(s), got {}", params.len()))
        }
    };
    let command = match name.as_str() {
        "version" => Command::Version,
        "devices" => Command::Devices,
        "state" => Command::State,
        "serialno" => Command::SerialNo,
        "start-server" => Command::StartServer,
        "kill-server" => Command::KillServer,
        "restart-server" => Command::RestartServer,
        "help" => Command::Help,
        "shell" => {
            if params.is_empty() {
                return Err("'shell' expects a command".to_string());
            }
            Command::Shell(params.to_vec())
        }
        "pull" => {
            arity(2)?;
            Command::Pull {
                remote: params[0].clone(),
                local: params[1].clone(),
            }
        }
        "push" => {
            arity(2)?;
            Command::Push {
                local: params[0].clone(),
                remote: params[1].clone(),
            }
        }
        "reboot" => {
            arity(1)?;
            Command::Reboot(params[0].clone())
        }
        "find" => {
            arity(1)?;
            Command::Find(params[0].clone())
        }
        other => return Err(format!("Unknown command: {other}")),
    };
    if !matches!(command, Command::Shell(_) | Command::Pull { .. } | Command::Push { .. } | Command::Reboot(_) | Command::Find(_)) {
        arity(0)?;
    }
    Ok(command)
}

fn print_help() {
    println!("🤖 Android ADB Bridge");
    println!();
    println!("USAGE:");
    println!("    android-adb-bridge [FLAGS] <COMMAND> [ARGS...]");
    println!();
    println!("FLAGS:");
    println!("    --adb=<path>        Path to the adb binary (default: $ADB_PATH, then PATH)");
    println!("    --device=<serial>   Target device (required when several are attached)");
    println!("    --no-auto-select    Do not target a lone device automatically");
    println!("    --debug             Enable debug logging");
    println!("    --help, -h          Show this help message");
    println!("    --version, -v       Show version information");
    println!();
    println!("COMMANDS:");
    println!("    version | devices | state | serialno | help");
    println!("    start-server | kill-server | restart-server");
    println!("    shell <cmd...>");
    println!("    pull <remote> <local>");
    println!("    push <local> <remote>");
    println!("    reboot <recovery|bootloader>");
    println!("    find <binary>");
    println!();
    println!("EXAMPLES:");
    println!("    android-adb-bridge devices");
    println!("    android-adb-bridge --device=emulator-5554 shell ls /sdcard");
    println!("    android-adb-bridge --adb=~/android-sdk-linux/platform-tools/adb pull /sdcard/a.txt a.txt");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flags_then_command() {
        let args = Args::parse_from(&strings(&[
            "--adb=/opt/adb",
            "--device=DEV1",
            "--debug",
            "shell",
            "ls",
            "--color",
        ]))
        .unwrap();
        assert_eq!(args.adb_path.as_deref(), Some("/opt/adb"));
        assert_eq!(args.device.as_deref(), Some("DEV1"));
        assert!(args.debug_mode);
        assert!(args.auto_select);
        assert_eq!(args.command, Command::Shell(strings(&["ls", "--color"])));
    }

    #[test]
    fn pull_needs_two_paths() {
        assert!(Args::parse_from(&strings(&["pull", "/sdcard/a"])).is_none());
        let args = Args::parse_from(&strings(&["pull", "/sdcard/a", "a"])).unwrap();
        assert_eq!(
            args.command,
            Command::Pull {
                remote: "/sdcard/a".to_string(),
                local: "a".to_string()
            }
        );
    }

    #[test]
    fn rejects_unknown_and_missing_commands() {
        assert!(Args::parse_from(&[]).is_none());
        assert!(Args::parse_from(&strings(&["frobnicate"])).is_none());
        assert!(Args::parse_from(&strings(&["devices", "extra"])).is_none());
        assert!(Args::parse_from(&strings(&["--bogus", "devices"])).is_none());
    }

    #[test]
    fn no_auto_select_flag() {
        let args = Args::parse_from(&strings(&["--no-auto-select", "state"])).unwrap();
        assert!(!args.auto_select);
        assert_eq!(args.command, Command::State);
    }
}
