/// How often the runtime should redraw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum RedrawMode {
    /// Only when something asks for a frame.
    #[default]
    OnDemand,
    /// Every vsync, while a gesture or stroke is live.
    Continuous,
}
