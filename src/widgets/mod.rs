pub mod charts;
pub mod controls;
pub mod metric_strip;
pub mod sections;
pub mod sidebar;
