//! Navajo Entity Schemas
//!
//! Resolves Navajo entity definitions (XML documents describing versioned
//! message trees) into a typed, cross-referenced model and generates client
//! code from it for Java, Kotlin, Swift and TypeScript.
//!
//! ## Features
//!
//! - **Fetch Closure**: every requested document plus everything it references
//!   through `extends` and `interfaces`, fetched once per path
//! - **Versioned References**: `navajo://pkg/Name.3` is checked against the
//!   target's current root version
//! - **Inheritance**: single, multiple (via a synthesized shared interface) and
//!   interface-only parents, with reference cycles reported as errors
//! - **Dependency Extraction**: which other entities a generated file imports
//! - **Emitters**: thin per-language consumers of the resolved model
//!
//! ## Architecture
//!
//! ```text
//! entities/
//! ├── common/
//! │   ├── Person.xml          <message name="Person.2"> ... </message>
//! │   └── Address.xml
//! └── club/
//!     └── Member.xml          extends="navajo://common/Person.2"
//!
//!   discover ──► DocumentSource (filesystem | rpc)
//!            ──► schema::resolve ──► EntitySet
//!            ──► codegen::generate ──► GeneratedOutput ──► write_output
//! ```

pub mod codegen;
pub mod config;
pub mod document;
pub mod error;
pub mod schema;
pub mod version;

pub use codegen::{generate, write_output, GenerateOptions, GeneratedOutput, Language};
pub use config::GeneratorConfig;
pub use document::{DocumentSource, Element, FilesystemSource, LoadConfig, RpcSource};
pub use error::{Result, SchemaError};
pub use schema::{resolve, resolve_documents, Entity, EntityId, EntitySet, Message};
pub use version::ToolVersion;
