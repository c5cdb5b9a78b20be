//! Read and write orchestrators for each format family.
//!
//! Every operation follows one sequence: validate, gate (writes only),
//! stage through a local temporary file, transfer, run the format codec,
//! release the staging file. The staging handle releases on drop, so the
//! file is gone on every exit path, success and failure alike.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::client::Drive;
use crate::error::{Error, Result};
use crate::formats::table::{TableReadOptions, TableWriteOptions};
use crate::formats::workbook::{WorkbookReadOptions, WorkbookWriteOptions};
use crate::formats::{archive, table as table_codec, workbook as workbook_codec};
use crate::path;
use crate::stage::Stage;
use crate::table::{Table, Workbook};

const TABLE_EXTENSIONS: &[&str] = &["csv"];
const WORKBOOK_READ_EXTENSIONS: &[&str] = &["xlsx", "xls"];
const WORKBOOK_WRITE_EXTENSIONS: &[&str] = &["xlsx"];
const OBJECT_EXTENSIONS: &[&str] = &["rds"];
const OBJECTS_EXTENSIONS: &[&str] = &["RData", "rda"];

/// Whether a write created a new item or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Overwritten,
}

impl WriteOutcome {
    pub fn overwritten(self) -> bool {
        matches!(self, WriteOutcome::Overwritten)
    }
}

impl Drive {
    /// Validate a remote path and download it into a staging file.
    async fn fetch(&self, path: &str, allowed: &[&str]) -> Result<Stage> {
        path::require_valid(path)?;
        path::require_extension(path, allowed)?;

        let stage = Stage::with_extension(path::extension(path).unwrap_or("tmp"))?;
        if let Err(err) = self.download(path, stage.path()).await {
            return Err(Error::transfer(path, err));
        }
        Ok(stage)
    }

    /// Probe the target and enforce the overwrite policy. Returns whether
    /// the target already exists.
    ///
    /// A probe failure is indistinguishable from absence here, and both
    /// permit a fresh write.
    async fn gate_overwrite(&self, path: &str, overwrite: bool) -> Result<bool> {
        let exists = matches!(self.probe(path).await, Ok(Some(_)));
        if exists && !overwrite {
            return Err(Error::Conflict(path.to_string()));
        }
        Ok(exists)
    }

    async fn folder_exists(&self, folder: &str) -> bool {
        matches!(self.probe(folder).await, Ok(Some(item)) if item.is_folder())
    }

    /// Encode into a staging file and upload it, enforcing the overwrite
    /// and parent-folder gates. Folders are never created here.
    async fn store<F>(
        &self,
        path: &str,
        allowed: &[&str],
        overwrite: bool,
        encode: F,
    ) -> Result<WriteOutcome>
    where
        F: FnOnce(&std::path::Path) -> Result<()>,
    {
        path::require_valid(path)?;
        path::require_extension(path, allowed)?;

        let existed = self.gate_overwrite(path, overwrite).await?;

        let stage = Stage::with_extension(path::extension(path).unwrap_or("tmp"))?;
        encode(stage.path()).map_err(|err| Error::encode(path, err))?;

        let (parent, _leaf) = path::split(path);
        if !parent.is_empty() && !self.folder_exists(parent).await {
            return Err(Error::MissingFolder(parent.to_string()));
        }

        match self.upload(stage.path(), path).await {
            Ok(_) => {
                debug!(path, overwritten = existed, "write complete");
                Ok(if existed {
                    WriteOutcome::Overwritten
                } else {
                    WriteOutcome::Created
                })
            }
            Err(err) => Err(Error::transfer(path, err)),
        }
    }

    /// Read a delimited-text table with the type-preserving codec.
    pub async fn read_table(&self, path: &str, options: &TableReadOptions) -> Result<Table> {
        let stage = self.fetch(path, TABLE_EXTENSIONS).await?;
        table_codec::decode(stage.path(), options).map_err(|err| Error::decode(path, err))
    }

    /// Read a delimited-text table with the fast verbatim codec.
    pub async fn read_table_fast(&self, path: &str, options: &TableReadOptions) -> Result<Table> {
        let stage = self.fetch(path, TABLE_EXTENSIONS).await?;
        table_codec::decode_raw(stage.path(), options).map_err(|err| Error::decode(path, err))
    }

    /// Write a table as delimited text.
    ///
    /// The existence check and the upload are not atomic with respect to
    /// the remote store; concurrent writers to the same path race and the
    /// last upload wins.
    pub async fn write_table(
        &self,
        table: &Table,
        path: &str,
        overwrite: bool,
        options: &TableWriteOptions,
    ) -> Result<WriteOutcome> {
        self.store(path, TABLE_EXTENSIONS, overwrite, |local| {
            table_codec::encode(table, local, options)
        })
        .await
    }

    /// Write a table as delimited text through the fast byte-record codec.
    pub async fn write_table_fast(
        &self,
        table: &Table,
        path: &str,
        overwrite: bool,
        options: &TableWriteOptions,
    ) -> Result<WriteOutcome> {
        self.store(path, TABLE_EXTENSIONS, overwrite, |local| {
            table_codec::encode_raw(table, local, options)
        })
        .await
    }

    /// Read a spreadsheet workbook, or one named sheet of it.
    pub async fn read_workbook(
        &self,
        path: &str,
        options: &WorkbookReadOptions,
    ) -> Result<Workbook> {
        let stage = self.fetch(path, WORKBOOK_READ_EXTENSIONS).await?;
        workbook_codec::decode(stage.path(), options).map_err(|err| Error::decode(path, err))
    }

    /// Write a workbook as `.xlsx`.
    pub async fn write_workbook(
        &self,
        workbook: &Workbook,
        path: &str,
        overwrite: bool,
        options: &WorkbookWriteOptions,
    ) -> Result<WriteOutcome> {
        self.store(path, WORKBOOK_WRITE_EXTENSIONS, overwrite, |local| {
            workbook_codec::encode(workbook, local, options)
        })
        .await
    }

    /// Load a single serialized value from an `.rds` archive.
    pub async fn load_object<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let stage = self.fetch(path, OBJECT_EXTENSIONS).await?;
        archive::decode(stage.path()).map_err(|err| Error::decode(path, err))
    }

    /// Save a single value as an `.rds` archive.
    pub async fn save_object<T: Serialize>(
        &self,
        value: &T,
        path: &str,
        overwrite: bool,
    ) -> Result<WriteOutcome> {
        self.store(path, OBJECT_EXTENSIONS, overwrite, |local| {
            archive::encode(value, local)
        })
        .await
    }

    /// Load a named collection of values from an `.RData`/`.rda` archive.
    ///
    /// The returned map is the caller's to bind wherever it wants; no
    /// ambient namespace is touched.
    pub async fn load_objects<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<BTreeMap<String, T>> {
        let stage = self.fetch(path, OBJECTS_EXTENSIONS).await?;
        archive::decode_many(stage.path()).map_err(|err| Error::decode(path, err))
    }

    /// Save a named collection of values as an `.RData`/`.rda` archive.
    pub async fn save_objects<T: Serialize>(
        &self,
        objects: &BTreeMap<String, T>,
        path: &str,
        overwrite: bool,
    ) -> Result<WriteOutcome> {
        self.store(path, OBJECTS_EXTENSIONS, overwrite, |local| {
            archive::encode_many(objects, local)
        })
        .await
    }
}
