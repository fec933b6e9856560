//! Side-channel log of every line written to the engine, for offline debugging.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

pub struct Transcript {
    out: BufWriter<File>,
}

impl Transcript {
    pub async fn create(path: &Path) -> std::io::Result<Self> {
        let file = File::create(path).await?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }

    pub async fn record(&mut self, line: &str) -> std::io::Result<()> {
        self.out.write_all(line.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        // The session may be dropped without shutdown, e.g. a failed start
        self.out.flush().await
    }

    pub async fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush().await
    }
}
