pub mod sdk;
pub mod boundary;
pub mod coords;
#[cfg(feature="system-loss_field")] pub mod loss_field;
#[cfg(feature="system-landmarks")]  pub mod landmarks;
