use std::fs;
use std::path::PathBuf;

use survey_core::{Deliver, Delivery, ExportError};
use tracing::info;

/// Writes file deliveries into a directory and keeps a line per delivery
/// (the written path, or the compose/share URI) for the caller to print.
#[derive(Debug)]
pub struct FsDeliverer {
    out_dir: PathBuf,
    reported: Vec<String>,
}

impl FsDeliverer {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            reported: Vec::new(),
        }
    }

    pub fn reported(&self) -> &[String] {
        &self.reported
    }
}

impl Deliver for FsDeliverer {
    fn deliver(&mut self, delivery: Delivery) -> Result<(), ExportError> {
        match delivery {
            Delivery::File { name, bytes, .. } => {
                fs::create_dir_all(&self.out_dir)?;
                let path = self.out_dir.join(&name);
                fs::write(&path, bytes)?;
                info!(path = %path.display(), "wrote export file");
                self.reported.push(path.display().to_string());
            }
            Delivery::Compose { uri } | Delivery::Share { uri } => self.reported.push(uri),
        }
        Ok(())
    }
}
