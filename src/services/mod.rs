pub mod allow_list;
pub mod fix_fetcher;
pub mod fix_manager;
pub mod fix_unpacker;
pub mod install_locator;
pub mod merge_applier;
pub mod notifier;
pub mod position_store;

pub use allow_list::SupportedApps;
pub use fix_fetcher::{FetchedArchive, FixSource};
pub use fix_manager::FixManager;
pub use install_locator::{InstallLocator, SteamLocator};
pub use notifier::{default_notifier, LogNotifier, MemoryNotifier, Notifier, ToastNotifier};
pub use position_store::PositionStore;
