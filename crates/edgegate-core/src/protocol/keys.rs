//! Body key catalogue (wire-level contract).
//!
//! `value` is overloaded: free capacity in registry messages, client count in
//! self-reports, the snapshot list in `Slaves`.

pub const SESSION_ID: &str = "sessionid";
pub const HOST: &str = "host";
pub const VALUE: &str = "value";
pub const ID: &str = "id";
pub const UNIX_ADDR: &str = "unixaddr";
pub const LOCAL_HOST: &str = "localhost";
pub const TAG: &str = "tag";
