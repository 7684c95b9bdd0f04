mod args;

use android_adb_bridge::adb::{AdbConfig, AdbResult, AdbSession, CommandResult, DeviceId};
use args::{Args, Command};

fn main() {
    let Some(args) = Args::parse() else {
        return;
    };

    let default_filter = if args.debug_mode { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("❌ Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(args)) {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}

fn print_result(result: &CommandResult) {
    for line in result.lines() {
        println!("{line}");
    }
    if let Some(err) = result.error() {
        eprintln!("{err}");
    }
}

async fn discover(adb: &mut AdbSession, device: Option<&str>) -> AdbResult<Vec<DeviceId>> {
    let devices = adb.discover_devices().await?;
    if let Some(device) = device {
        adb.select_target(device)?;
    }
    Ok(devices)
}

async fn run(args: Args) -> AdbResult<()> {
    let mut config = match &args.adb_path {
        Some(path) => AdbConfig::with_adb_path(path)?,
        None => AdbConfig::from_env()?,
    };
    config.auto_select_single_device = args.auto_select;
    let mut adb = AdbSession::new(config);
    let device = args.device.as_deref();

    let result = match args.command {
        Command::Version => {
            println!("{}", adb.get_version().await?);
            return Ok(());
        }
        Command::StartServer => adb.start_server().await?,
        Command::KillServer => adb.kill_server().await?,
        Command::RestartServer => adb.restart_server().await?,
        Command::Help => adb.get_help().await?,
        Command::Devices => {
            let devices = discover(&mut adb, device).await?;
            if devices.is_empty() {
                println!("📱 No devices attached");
            }
            for device in &devices {
                println!("{device}");
            }
            return Ok(());
        }
        Command::Find(name) => {
            discover(&mut adb, device).await?;
            println!("{}", adb.find_binary(&name).await?);
            return Ok(());
        }
        Command::State => {
            discover(&mut adb, device).await?;
            adb.get_state().await?
        }
        Command::SerialNo => {
            discover(&mut adb, device).await?;
            adb.get_serialno().await?
        }
        Command::Shell(words) => {
            discover(&mut adb, device).await?;
            let words: Vec<&str> = words.iter().map(String::as_str).collect();
            adb.shell_command(&words).await?
        }
        Command::Pull { remote, local } => {
            discover(&mut adb, device).await?;
            adb.get_remote_file(&remote, &local).await?.ensure_success("pull")?
        }
        Command::Push { local, remote } => {
            discover(&mut adb, device).await?;
            adb.push_local_file(&local, &remote).await?.ensure_success("push")?
        }
        Command::Reboot(mode) => {
            discover(&mut adb, device).await?;
            adb.reboot_device_named(&mode).await?
        }
    };
    print_result(&result);
    Ok(())
}
