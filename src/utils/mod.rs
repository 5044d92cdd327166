pub mod logging;
pub mod privileges;
