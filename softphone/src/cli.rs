//! Command line options

use std::net::SocketAddr;

/// Five seconds of 20 ms frames.
pub const DEFAULT_FRAMES: u64 = 250;

pub const USAGE: &str = "usage: softphone [config.json] [--remote host:port] [--frames N]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub config_path: Option<String>,
    pub remote: Option<SocketAddr>,
    pub frames: u64,
}

impl Options {
    pub fn parse<I>(args: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Options {
            config_path: None,
            remote: None,
            frames: DEFAULT_FRAMES,
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--remote" => {
                    let value = args.next().ok_or("--remote needs an address")?;
                    let remote = value
                        .parse()
                        .map_err(|_| format!("invalid remote address: {}", value))?;
                    options.remote = Some(remote);
                }
                "--frames" => {
                    let value = args.next().ok_or("--frames needs a count")?;
                    options.frames = value
                        .parse()
                        .map_err(|_| format!("invalid frame count: {}", value))?;
                }
                flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
                path if options.config_path.is_none() => options.config_path = Some(path.to_string()),
                extra => return Err(format!("unexpected argument {}", extra)),
            }
        }

        Ok(options)
    }
}
