//! # localtools
//!
//! Installs the tools declared in a .NET local tool manifest (`dotnet-tools.json`).
//!
//! A host names a manifest with a `toolmanifest:?package=<path>` reference. The
//! [`ToolManifestPackageInstaller`] reads the manifest, turns every tool into a
//! `dotnet:?package=<id>&version=<version>` reference and hands each one to a
//! delegate [`ToolPackageInstaller`], collecting the files it installs.
//!
//! ## Modules Overview
//! - [`manifest`] – The in-memory manifest model (`ToolManifest`, `ManifestEntry`)
//! - [`reader`] – Loading and validating `dotnet-tools.json`
//! - [`reference`] – Package references and the entry-to-reference translation
//! - [`installer`] – The installer traits and the manifest-driven installer
//! - [`dotnet`] – Delegate installer backed by `dotnet tool install`
//! - [`fs`] – File system and working-directory abstractions
//! - [`config`] – User configuration (`config.toml`)
//! - [`error`] – The error type shared by all of the above

pub mod error;
pub mod fs;
pub mod manifest;
pub mod reference;
pub mod reader;
pub mod installer;
pub mod dotnet;
pub mod config;

pub use error::InstallError;
pub use fs::{Environment, FileHandle, FileSystem, LocalFileSystem, ProcessEnvironment};
pub use manifest::{ManifestEntry, ToolManifest};
pub use reference::{manifest_reference, to_package_reference, PackageReference, DOTNET_TOOL_SCHEME, TOOL_MANIFEST_SCHEME};
pub use reader::{JsonManifestReader, ManifestReader, SUPPORTED_MANIFEST_VERSION};
pub use installer::{PackageInstaller, PackageType, ToolManifestPackageInstaller, ToolPackageInstaller};
pub use dotnet::DotNetToolInstaller;
pub use config::Config;
