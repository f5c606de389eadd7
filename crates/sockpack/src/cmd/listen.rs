use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sockpack_frame::FrameError;
use sockpack_net::{NetError, Server};

use crate::cmd::{load_cipher, ListenArgs};
use crate::exit::{net_error, CliError, CliResult, SUCCESS};
use crate::output::{print_value, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let cipher = load_cipher(args.key_file.as_ref())?;
    let mut server =
        Server::bind(args.addr.as_str()).map_err(|err| net_error("bind failed", err))?;
    if let Some(cipher) = cipher {
        server = server.with_cipher(cipher);
    }

    let handle = server.handle();
    install_ctrlc_handler(handle.clone())?;

    let printed = Arc::new(AtomicUsize::new(0));
    let count = args.count;
    let shutdown_handle = handle.clone();

    server
        .run(move |mut connection| loop {
            match connection.receive() {
                Ok(value) => {
                    print_value(&value, connection.id(), format);
                    let total = printed.fetch_add(1, Ordering::SeqCst) + 1;
                    if count.is_some_and(|limit| total >= limit) {
                        shutdown_handle.shutdown();
                        return Ok(());
                    }
                }
                Err(NetError::Frame(FrameError::ConnectionClosed)) => return Ok(()),
                Err(err) => return Err(err),
            }
        })
        .map_err(|err| net_error("server failed", err))?;

    Ok(SUCCESS)
}

fn install_ctrlc_handler(handle: sockpack_net::ServerHandle) -> CliResult<()> {
    ctrlc::set_handler(move || {
        handle.shutdown();
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
