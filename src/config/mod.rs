mod settings;

pub use settings::{
    ApiConfig, BadgeStyle, CountdownDisplayConfig, DisplayConfig, DisplayMode, Settings,
    StorageConfig, TopBarGlobalConfig,
};
