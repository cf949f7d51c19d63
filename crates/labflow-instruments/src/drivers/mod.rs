/*!
 * Instrument drivers shipped with LabFlow.
 *
 * Every driver here is also registered in
 * [`DriverRegistry::builtin`](crate::registry::DriverRegistry::builtin),
 * which is what makes it visible to the convention harness.
 */

pub mod tektronix;

pub use tektronix::Tbs2000b;
