use std::{
    io::{
        self,
        BufRead,
        Write,
    },
    path::PathBuf,
};

use anyhow::Context;
use dirsweep::{
    BatchDeleter,
    DeleteProgress,
    ScanOptions,
    Scanner,
    SizeStrategy,
};
use serde::{
    de::DeserializeOwned,
    Deserialize,
};
use serde_json::{
    json,
    Value,
};

/// The only operations a front end may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    SelectDirectory,
    ScanDirectory,
    DeleteDirectory,
    DeleteDirectories,
    OpenExternal,
}

impl Channel {
    pub fn from_name(name: &str) -> Option<Self> {
        let channel = match name {
            "select-directory" => Self::SelectDirectory,
            "scan-directory" => Self::ScanDirectory,
            "delete-directory" => Self::DeleteDirectory,
            "delete-directories" => Self::DeleteDirectories,
            "open-external" => Self::OpenExternal,
            _ => return None,
        };

        Some(channel)
    }
}

const EVENT_DELETE_PROGRESS: &str = "delete-progress";

#[derive(Deserialize, Debug)]
struct Request {
    #[serde(default)]
    id: Value,
    channel: String,
    #[serde(default)]
    args: Vec<Value>,
}

type LinkOpener = Box<dyn FnMut(&str) -> io::Result<()>>;

/// Serves JSON line requests from a front end which already asked the user
/// for confirmation before sending any delete request.
pub struct Bridge {
    size_strategy: SizeStrategy,
    deleter: BatchDeleter,
    selected_root: Option<PathBuf>,
    link_opener: LinkOpener,
}

impl Bridge {
    pub fn new(
        size_strategy: SizeStrategy,
        deleter: BatchDeleter,
        selected_root: Option<PathBuf>,
    ) -> Self {
        Self {
            size_strategy,
            deleter,
            selected_root,
            link_opener: Box::new(|url: &str| webbrowser::open(url)),
        }
    }

    pub fn with_link_opener(mut self, opener: impl FnMut(&str) -> io::Result<()> + 'static) -> Self {
        self.link_opener = Box::new(opener);
        self
    }

    /// Answer every request line until the input has been closed.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line.context("failed to read request")?;
            if line.trim().is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<Request>(&line) {
                Ok(request) => {
                    let id = request.id.clone();
                    match self.handle(request, output) {
                        Ok(result) => json!({ "id": id, "ok": true, "result": result }),
                        Err(error) => {
                            log::warn!("Request {} failed: {:#}", id, error);
                            json!({ "id": id, "ok": false, "error": format!("{:#}", error) })
                        }
                    }
                }
                Err(error) => json!({
                    "id": Value::Null,
                    "ok": false,
                    "error": format!("invalid request: {}", error),
                }),
            };

            write_message(output, &response).context("failed to write response")?;
        }

        log::debug!("Bridge input closed");
        Ok(())
    }

    fn handle<W: Write>(&mut self, request: Request, output: &mut W) -> anyhow::Result<Value> {
        let Some(channel) = Channel::from_name(&request.channel) else {
            anyhow::bail!("Unauthorized IPC channel: {}", request.channel);
        };
        log::debug!("Handling {:?}", channel);

        match channel {
            Channel::SelectDirectory => Ok(match &self.selected_root {
                Some(root) => json!({ "canceled": false, "filePaths": [root] }),
                None => json!({ "canceled": true, "filePaths": [] }),
            }),
            Channel::ScanDirectory => {
                let path: PathBuf = argument(&request.args, 0)?;
                let mut scanner = Scanner::new(ScanOptions {
                    size_strategy: self.size_strategy,
                    ..Default::default()
                });

                let result = scanner.scan(&path)?;
                Ok(serde_json::to_value(result)?)
            }
            Channel::DeleteDirectory => {
                let path: PathBuf = argument(&request.args, 0)?;
                self.deleter.delete_one(&path)?;
                Ok(Value::Bool(true))
            }
            Channel::DeleteDirectories => {
                let paths: Vec<PathBuf> = argument(&request.args, 0)?;

                let mut write_error = None;
                let outcomes = self
                    .deleter
                    .delete_many(&paths, &mut |progress: DeleteProgress| {
                        if write_error.is_some() {
                            return;
                        }

                        let event = json!({
                            "event": EVENT_DELETE_PROGRESS,
                            "payload": progress.percent,
                        });
                        if let Err(error) = write_message(&mut *output, &event) {
                            write_error = Some(error);
                        }
                    });

                if let Some(error) = write_error {
                    return Err(error).context("failed to write progress");
                }
                Ok(serde_json::to_value(outcomes)?)
            }
            Channel::OpenExternal => {
                let url: String = argument(&request.args, 0)?;
                (self.link_opener)(&url).with_context(|| format!("failed to open {}", url))?;
                Ok(Value::Bool(true))
            }
        }
    }
}

fn argument<T: DeserializeOwned>(args: &[Value], index: usize) -> anyhow::Result<T> {
    let value = args
        .get(index)
        .with_context(|| format!("missing argument {}", index))?;

    serde_json::from_value(value.clone()).with_context(|| format!("invalid argument {}", index))
}

fn write_message<W: Write>(output: &mut W, message: &Value) -> io::Result<()> {
    serde_json::to_writer(&mut *output, message)?;
    output.write_all(b"\n")?;
    output.flush()
}
