use crate::export::ExportError;

/// Boundary effect produced by an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Save a generated file.
    File {
        name: String,
        media_type: &'static str,
        bytes: Vec<u8>,
    },
    /// Open a prefilled message-compose target.
    Compose { uri: String },
    /// Open a prefilled share link.
    Share { uri: String },
}

impl Delivery {
    pub fn uri(&self) -> Option<&str> {
        match self {
            Delivery::Compose { uri } | Delivery::Share { uri } => Some(uri),
            Delivery::File { .. } => None,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match self {
            Delivery::File { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Receiver of export side effects (file save, compose window, share link).
pub trait Deliver {
    fn deliver(&mut self, delivery: Delivery) -> Result<(), ExportError>;
}

/// Collects deliveries instead of performing them.
impl Deliver for Vec<Delivery> {
    fn deliver(&mut self, delivery: Delivery) -> Result<(), ExportError> {
        self.push(delivery);
        Ok(())
    }
}
