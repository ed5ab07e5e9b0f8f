mod actions;
mod bar;
mod client;
mod config;
mod events;
mod layouts;
mod monitor;
mod state;
mod utils;
mod xconn;
mod xwrapper;

#[cfg(test)]
mod tests;
#[cfg(test)]
mod xmock;

use std::ffi::CString;
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::Write;
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::Command;

use simplelog::{CombinedLogger, Config, LevelFilter, WriteLogger};

use state::{Rawm, VERSION_STRING};
use xwrapper::XWrapper;

fn die(msg: &str) -> ! {
    eprintln!("{}", msg);
    std::process::exit(1);
}

fn log_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(std::env::temp_dir);
    path.push("rawm");
    let _ = create_dir_all(&path);
    path.push("rawm.log");
    path
}

fn setup_logger(path: &PathBuf) {
    if let Ok(file) = File::create(path) {
        let _ = CombinedLogger::init(vec![WriteLogger::new(
            LevelFilter::Info,
            Config::default(),
            file,
        )]);
    }
}

/// Panics otherwise vanish with the X session; append them to the log file.
fn setup_panic_hook(path: PathBuf) {
    std::panic::set_hook(Box::new(move |info| {
        let msg = format!("PANIC: {}\n", info);
        eprint!("{}", msg);
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) {
            let _ = file.write_all(msg.as_bytes());
        }
    }));
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() == 2 && args[1] == "-v" {
        die(VERSION_STRING);
    } else if args.len() != 1 {
        die("usage: rawm [-v]");
    }

    let path = log_path();
    setup_logger(&path);
    setup_panic_hook(path);

    unsafe {
        let empty = CString::new("").unwrap();
        if libc::setlocale(libc::LC_CTYPE, empty.as_ptr()).is_null()
            || x11::xlib::XSupportsLocale() == 0
        {
            eprintln!("warning: no locale support");
        }
    }

    let mut conn = match XWrapper::connect() {
        Ok(conn) => conn,
        Err(e) => die(&format!("rawm: {}", e)),
    };
    if let Err(e) = xconn::XConn::check_other_wm(&mut conn) {
        die(&format!("rawm: {}", e));
    }

    utils::install_signal_handlers();

    log::info!("starting {}", VERSION_STRING);
    let mut wm = Rawm::new(conn);
    wm.scan();
    wm.run();

    if wm.restart {
        log::info!("restarting");
        let err = Command::new(&args[0]).args(&args[1..]).exec();
        log::error!("restart failed: {}", err);
    }

    wm.cleanup();
    log::info!("bye");
}
