/*!
 * Adapter implementations shipped with LabFlow.
 *
 * Real transports (VISA, GPIB, serial, LAN) live outside this crate; what
 * ships here are the stand-in and simulated adapters the convention
 * harness and the driver tests run against.
 */

pub mod mock;
pub mod sim;

pub use mock::MockAdapter;
pub use sim::SimAdapter;
