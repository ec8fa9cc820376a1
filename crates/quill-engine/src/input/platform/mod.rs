mod winit;

pub use self::winit::WinitPointerInput;
