mod target_select;
pub use target_select::*;

mod text;
pub use text::*;

mod scan;
pub use scan::*;

mod sweeping;
pub use sweeping::*;

mod app;
pub use app::*;
