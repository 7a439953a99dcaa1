/// Environment variable holding a comma separated override of the eager-load exclusions.
pub const EAGER_LOAD_EXCLUSIONS_ENV: &str = "SAVINGS_EAGER_LOAD_EXCLUSIONS";

/// External identifiers of rewards-distribution and marketplace settlement accounts.
///
/// These accounts carry very large transaction histories, so single-account lookups
/// leave their collections unresolved and their summary untouched.
pub const DEFAULT_EAGER_LOAD_EXCLUSIONS: [&str; 8] = [
    "0xa733c93d0fa79b32fd6f926a6f928e471f2a5630",
    "0xfea63fda5caef8a4fbbe4e3242f166cb5fdcb8d0",
    // rewards (2)
    "0x274405d1fef12ae8333a75f8da3d233ad8fcd97f",
    // rewards (3)
    "0x2df62982a3295ab8af0457b4d16cb954df4a1456",
    // marketplace uganda (2)
    "0x065f0c2858682ed87420aaaabbfb978900e5e911",
    // marketplace south africa
    "0xa95c6e8930b4eee03f4538665c8f1a9e5ebd9843",
    // marketplace uganda
    "0x91baceea8ae05a2a2cb9c5fde20d5226bf0c3638",
    // marketplace zimbabwe
    "0x50015652274615a12610cc48d32a26a6416514cc",
];
