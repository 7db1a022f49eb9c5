//! Speech synthesis through the Pollinations.ai text endpoint.
//!
//! `GET {base}/{text}?model=..&voice=..` returns MP3 bytes, which are
//! written to the host temp directory and tracked for cleanup.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::Rng;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, error, info, warn};

use crate::chat::REQUEST_TIMEOUT;
use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::retry::RetryPolicy;
use crate::temp_files::{PendingFiles, TmpDir};

const FILE_PREFIX: &str = "voice_reply";
const SUFFIX_LEN: usize = 6;

pub struct SpeechClient {
    config: SpeechConfig,
    client: Client,
    retry: RetryPolicy,
    tmp_dir: TmpDir,
    pending: Arc<PendingFiles>,
}

impl SpeechClient {
    pub fn new(
        config: SpeechConfig,
        retry: RetryPolicy,
        tmp_dir: TmpDir,
        pending: Arc<PendingFiles>,
    ) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            config,
            client,
            retry,
            tmp_dir,
            pending,
        }
    }

    /// Synthesize `text` to an MP3 file. `None` if no audio was produced.
    pub fn synthesize(&self, text: &str) -> Option<PathBuf> {
        match self.try_synthesize(text) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Speech synthesis failed: {e}");
                None
            }
        }
    }

    pub fn try_synthesize(&self, text: &str) -> Result<PathBuf, SpeechError> {
        if text == "." || text == ".." {
            return Err(SpeechError::DotSegment(text.to_string()));
        }

        let url = self.request_url(text);
        debug!("Speech request URL: {url}");

        let resp = self
            .retry
            .run("Speech API request", || {
                self.client
                    .get(&url)
                    .query(&[
                        ("model", self.config.model.as_str()),
                        ("voice", self.config.voice.as_str()),
                    ])
                    .send()
                    .and_then(|resp| resp.error_for_status())
            })
            .map_err(SpeechError::Request)?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(SpeechError::Status(status));
        }

        let audio = resp.bytes().map_err(SpeechError::Body)?;
        let (path, size) = self.write_audio(&audio)?;
        self.pending.register(path.clone());

        info!(
            "Speech generated: {}, size: {:.2}KB",
            path.display(),
            size as f64 / 1024.0
        );
        Ok(path)
    }

    fn request_url(&self, text: &str) -> String {
        format!("{}/{}", self.config.base, urlencoding::encode(text))
    }

    fn write_audio(&self, audio: &[u8]) -> Result<(PathBuf, u64), SpeechError> {
        let path = self.tmp_dir.path()?.join(audio_file_name());

        // create_new: never clobber an existing file, and never delete one we didn't create
        let file = OpenOptions::new().write(true).create_new(true).open(&path)?;

        let size = match write_all(file, &path, audio) {
            Ok(size) => size,
            Err(e) => {
                remove_partial(&path);
                return Err(e.into());
            }
        };

        if size == 0 {
            error!("Downloaded audio file is empty: {}", path.display());
            remove_partial(&path);
            return Err(SpeechError::EmptyAudio);
        }

        Ok((path, size))
    }
}

/// `voice_reply_<unix seconds>_<6 lowercase letters>.mp3`
fn audio_file_name() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| rng.gen_range(b'a'..=b'z') as char)
        .collect();
    format!(
        "{FILE_PREFIX}_{}_{suffix}.mp3",
        chrono::Local::now().timestamp()
    )
}

fn write_all(mut file: File, path: &Path, audio: &[u8]) -> io::Result<u64> {
    file.write_all(audio)?;
    file.flush()?;
    drop(file);
    Ok(fs::metadata(path)?.len())
}

fn remove_partial(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            error!("Failed to remove partial audio file {}: {e}", path.display());
        }
    }
}
