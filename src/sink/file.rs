// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::Error;
use crate::formatter::Formatter;
use crate::formatter::PlainTextFormatter;
use crate::record::Record;
use crate::sink::Sink;

#[derive(Debug)]
struct FileState {
    path: PathBuf,
    file: Option<File>,
}

impl FileState {
    fn file(&mut self) -> Result<&mut File, Error> {
        let file = match self.file.take() {
            Some(file) => file,
            None => open_append(&self.path)?,
        };
        Ok(self.file.insert(file))
    }
}

fn open_append(path: &Path) -> Result<File, Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| {
                Error::from_io_error(err).with_context("path", parent.display())
            })?;
        }
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| Error::from_io_error(err).with_context("path", path.display()))
}

/// A sink that appends log records to a single file.
///
/// The file, and any missing parent directory, is created on [`open`](Sink::open) or on the
/// first record. Changing the `path` property closes the current file; the next record opens
/// the new one.
///
/// # Examples
///
/// ```no_run
/// use logweave::sink::FileSink;
///
/// let sink = FileSink::new("logs/app.log");
/// ```
#[derive(Debug)]
pub struct FileSink {
    state: Mutex<FileState>,
    formatter: Box<dyn Formatter>,
}

impl FileSink {
    /// Create a file sink writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            state: Mutex::new(FileState {
                path: path.into(),
                file: None,
            }),
            formatter: Box::new(PlainTextFormatter::default().no_color()),
        }
    }

    /// Set the formatter for the [`FileSink`].
    ///
    /// Default to [`PlainTextFormatter`] without colors.
    pub fn with_formatter(mut self, formatter: impl Into<Box<dyn Formatter>>) -> Self {
        self.formatter = formatter.into();
        self
    }

    /// The path records are written to.
    pub fn path(&self) -> PathBuf {
        self.state().path.clone()
    }

    fn state(&self) -> MutexGuard<'_, FileState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Sink for FileSink {
    fn log(&self, record: &Record) -> Result<(), Error> {
        let mut text = self.formatter.format(record)?;
        text.push('\n');
        let mut state = self.state();
        let file = state.file()?;
        file.write_all(text.as_bytes()).map_err(Error::from_io_error)
    }

    fn open(&self) -> Result<(), Error> {
        self.state().file().map(|_| ())
    }

    fn close(&self) -> Result<(), Error> {
        let mut state = self.state();
        if let Some(mut file) = state.file.take() {
            file.flush().map_err(Error::from_io_error)?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        let mut state = self.state();
        match state.file.as_mut() {
            Some(file) => file.flush().map_err(Error::from_io_error),
            None => Ok(()),
        }
    }

    fn set_property(&self, name: &str, value: &str) -> Result<(), Error> {
        match name {
            "path" => {
                if value.is_empty() {
                    return Err(Error::invalid_argument("file path must not be empty", value));
                }
                let mut state = self.state();
                state.file = None;
                state.path = PathBuf::from(value);
                Ok(())
            }
            _ => Err(Error::property_not_supported(name)),
        }
    }

    fn get_property(&self, name: &str) -> Result<String, Error> {
        match name {
            "path" => Ok(self.state().path.display().to_string()),
            _ => Err(Error::property_not_supported(name)),
        }
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(file) = state.file.as_mut() {
            let _ = file.flush();
        }
    }
}
