use sockpack_frame::FrameError;
use sockpack_net::{NetError, Server};

use crate::cmd::{load_cipher, EchoArgs};
use crate::exit::{net_error, CliError, CliResult, SUCCESS};

pub fn run(args: EchoArgs) -> CliResult<i32> {
    let cipher = load_cipher(args.key_file.as_ref())?;
    let mut server =
        Server::bind(args.addr.as_str()).map_err(|err| net_error("bind failed", err))?;
    if let Some(cipher) = cipher {
        server = server.with_cipher(cipher);
    }

    let handle = server.handle();
    ctrlc::set_handler(move || {
        handle.shutdown();
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })?;

    server
        .run(|mut connection| loop {
            match connection.receive() {
                Ok(value) => connection.send(&value)?,
                Err(NetError::Frame(FrameError::ConnectionClosed)) => return Ok(()),
                Err(err) => return Err(err),
            }
        })
        .map_err(|err| net_error("server failed", err))?;

    Ok(SUCCESS)
}
