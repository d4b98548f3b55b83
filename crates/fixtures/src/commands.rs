#[derive(Debug, Default, PartialEq, Eq)]
pub struct Refresh;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Default)]
pub struct FirstRun;

pub mod jobs {
    #[derive(Debug, Default)]
    pub struct Purge;
}

busgen::event_map! {
    // busgen:prefix Command
    pub Commands = {
        "cache.refresh" => Refresh {},
        "window.resize" => <Resize>::default(),
        "jobs.purge" => jobs::Purge {},
        "1st.run" => FirstRun {},
    };
}

mod commandbus {
    include!(concat!(env!("OUT_DIR"), "/commandbus.rs"));
}

pub use commandbus::{CommandBus, CommandEvent, CommandPayload};
