use crate::config::settings::DownloadSettings;
use crate::utils::error::{MoittError, Result};
use futures_util::StreamExt;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Streams vendor tarballs to disk.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(settings: &DownloadSettings) -> Result<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(settings.accept_invalid_certs);
        if let Some(seconds) = settings.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// 下載至 `dest`，回傳寫入位元組數。
    /// 伺服器有回報 Content-Length 時，寫入量不符即視為失敗。
    pub async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<u64> {
        tracing::info!("⬇️  Downloading {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;

        let expected = response.content_length().unwrap_or(0);
        if expected == 0 {
            tracing::debug!("No Content-Length for {}, size check skipped", url);
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        let mut next_report = 10;

        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                // 連線中斷；已知長度時回報實際收到多少
                Err(e) if expected > 0 => {
                    tracing::warn!("Download of {} interrupted: {}", url, e);
                    return Err(MoittError::DownloadIncomplete {
                        url: url.to_string(),
                        expected,
                        actual: written,
                    });
                }
                Err(e) => return Err(e.into()),
            };
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;

            if expected > 0 {
                let percent = written * 100 / expected;
                if percent >= next_report {
                    tracing::info!("    {}% ({} / {} KB)", percent, written / 1024, expected / 1024);
                    next_report = (percent / 10 + 1) * 10;
                }
            }
        }
        file.flush().await?;

        if expected != 0 && written != expected {
            return Err(MoittError::DownloadIncomplete {
                url: url.to_string(),
                expected,
                actual: written,
            });
        }

        tracing::debug!("Wrote {} bytes to {}", written, dest.display());
        Ok(written)
    }
}
