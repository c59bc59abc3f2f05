// Test modules for timetable-client crate
//
// Each source file has a corresponding test file that focuses on behavior
// verification. HTTP round trips live in the integration tests under tests/.

pub mod messages;
pub mod validation;
