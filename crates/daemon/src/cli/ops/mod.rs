pub mod caps;
pub mod daemon;
pub mod get;
pub mod health;
pub mod init;
pub mod mkdir;
pub mod mv;
pub mod put;
pub mod rm;
pub mod version;

pub use caps::Caps;
pub use daemon::Daemon;
pub use get::Get;
pub use health::Health;
pub use init::Init;
pub use mkdir::Mkdir;
pub use mv::Mv;
pub use put::Put;
pub use rm::Rm;
pub use version::Version;
