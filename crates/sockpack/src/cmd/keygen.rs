use sockpack_frame::MessageCipher;

use crate::cmd::KeygenArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: KeygenArgs) -> CliResult<i32> {
    let (key, _) = MessageCipher::generate();
    let encoded = hex::encode(key);

    match &args.out {
        Some(path) => {
            std::fs::write(path, format!("{encoded}\n")).map_err(|err| {
                crate::exit::io_error(&format!("failed writing {}", path.display()), err)
            })?;
        }
        None => println!("{encoded}"),
    }

    Ok(SUCCESS)
}
