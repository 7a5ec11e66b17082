//! # bimil
//!
//! Core engines of the Bimil password manager, free of any GUI toolkit.
//!
//! ## Features
//!
//! - **QR Code Encoder**: QR Code Model 2 with numeric, alphanumeric and byte modes,
//!   Reed-Solomon error correction and penalty based mask selection
//! - **Auto-type**: A small scripting language for typing entry fields into other
//!   applications, with a worker that types the expanded keys
//! - **TOTP**: RFC 6238 two-factor codes and base32 secrets
//! - **Password Generator**: Weighted random passwords with pronounceable and
//!   no-repeat modes, plus crack time estimates
//! - **Breach Checks**: Breach applicability, pwned-password range checks and a
//!   common-password filter
//!
//! ## Quick Start
//!
//! ### QR Code Generation
//!
//! ```rust
//! use bimil::{ECLevel, QRBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Version and mask are chosen automatically unless forced
//! let qr = QRBuilder::new("HELLO WORLD").ec_level(ECLevel::Q).build()?;
//! assert_eq!(qr.width(), 21);
//!
//! let img = qr.render(4); // 4 pixels per module, quiet zone included
//! assert_eq!(img.width(), (21 + 8) * 4);
//!
//! // Plain module matrix, quiet zone included
//! let matrix = bimil::encode("01234567", ECLevel::M)?;
//! assert_eq!(matrix.width(), 29);
//! # Ok(())
//! # }
//! ```
//!
//! ### Auto-type
//!
//! ```rust
//! use bimil::autotype::{describe, parse_script, Entry, RecordType};
//!
//! let tokens = parse_script(r"\u\t\p\n");
//! assert_eq!(describe(&tokens), "UserName {Tab} Password {Enter}");
//!
//! let entry = Entry::new()
//!     .with_text(RecordType::UserName, "me")
//!     .with_text(RecordType::Password, "pw")
//!     .with_text(RecordType::Autotype, r"\u\t\p\n");
//! assert_eq!(describe(&entry.autotype_tokens()), "m e {Tab} p w {Enter}");
//! ```
//!
//! ### Two-factor Codes
//!
//! ```rust
//! use bimil::totp::Totp;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let totp = Totp::from_base32("GEZD GNBV GY3T QOJQ GEZD GNBV GY3T QOJQ")?;
//! assert_eq!(totp.code_at(59)?, "287082");
//! # Ok(())
//! # }
//! ```
//!
//! ### Password Generation
//!
//! ```rust
//! use bimil::password::{combination_stats, crack_duration_text, generate, PasswordOptions};
//!
//! let options = PasswordOptions::default();
//! let password = generate(&options).expect("default options are valid");
//! assert_eq!(password.chars().count(), 14);
//!
//! let stats = combination_stats(options.combinations().unwrap_or_default());
//! println!("{} to crack", crack_duration_text(stats.crack_seconds));
//! ```
//!
//! ## QR Code Components
//!
//! ### Versions
//! - **Normal QR**: Versions 1-40, with sizes from 21x21 to 177x177 modules
//!
//! ### Error Correction Levels
//! - **L (Low)**: ~7% error correction
//! - **M (Medium)**: ~15% error correction
//! - **Q (Quartile)**: ~25% error correction
//! - **H (High)**: ~30% error correction

#![allow(clippy::items_after_test_module)]

pub mod autotype;
pub mod breach;
pub mod builder;
pub(crate) mod common;
pub mod password;
pub mod render;
pub mod totp;

pub use builder::{encode_matrix as encode, QRBuilder, QR};
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{ECLevel, Version};
pub use render::ModuleMatrix;
