//! Scenario tests: the key manager core driven against an in-memory ERC725 profile.


mod relay;
mod signatures;
