pub const DEFAULT_ACME_ROOT: &str = "/mnt/acme";
pub const DEFAULT_INFO_CMD: &str = "songinfo";
pub const DEFAULT_MPD_HOST: &str = "localhost";
pub const DEFAULT_MPD_PORT: u16 = 6600;

/// Separates the password from the host in `MPD_HOST`.
pub(super) const CREDENTIAL_SEPARATOR: char = '@';
