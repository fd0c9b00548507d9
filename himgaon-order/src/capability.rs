/// Proof that the caller passed admin authentication.
///
/// The auth boundary mints one after verifying credentials and hands it to every admin
/// operation. It carries no authority beyond its existence and the admin's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCapability {
    subject: String,
}

impl AdminCapability {
    pub fn grant(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    /// Admin username the capability was granted to, for audit logging.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}
