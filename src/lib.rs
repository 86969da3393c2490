pub mod error;

pub mod service {
    pub mod config_service;
}

pub mod config {
    pub mod config;
    pub mod ports;
}

pub mod models {
    pub mod configuration;
    pub mod conversion;
}

pub mod facade {
    pub mod conversion_facade;
    pub mod traits {
        pub mod i_conversion;
    }
}

pub mod action {
    pub mod cli;
    pub mod interactive;
}

pub mod utils {
    pub mod process;
    pub mod utils;
}
