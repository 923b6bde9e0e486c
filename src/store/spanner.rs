use anyhow::{Context, Result};
use gcloud_gax::grpc::Code;
use gcloud_googleapis::spanner::admin::database::v1::{
    CreateDatabaseRequest, GetDatabaseDdlRequest, GetDatabaseRequest, UpdateDatabaseDdlRequest,
};
use gcloud_googleapis::spanner::admin::instance::v1::{
    CreateInstanceRequest, GetInstanceRequest, Instance,
};
use gcloud_spanner::admin::client::Client as AdminClient;
use gcloud_spanner::admin::AdminClientConfig;
use gcloud_spanner::client::{Client, ClientConfig};
use gcloud_spanner::key::Key;
use gcloud_spanner::mutation::{delete, insert};
use gcloud_spanner::row::Row;
use gcloud_spanner::statement::Statement;
use gcloud_spanner::value::CommitTimestamp;
use std::sync::Arc;

use crate::config::SpannerSettings;
use crate::models::{Note, NoteDraft};
use crate::note_id::NoteId;

const NOTES_TABLE: &str = "notes";

const CREATE_NOTES_TABLE: &str = r#"
CREATE TABLE notes (
    id STRING(24) NOT NULL,
    content STRING(MAX) NOT NULL,
    important BOOL NOT NULL,
    created_at TIMESTAMP NOT NULL OPTIONS (allow_commit_timestamp=true),
) PRIMARY KEY (id)
"#;

/// Shareable Spanner client for use across async handlers
#[derive(Clone)]
pub struct SpannerClient {
    inner: Arc<Client>,
}

impl SpannerClient {
    /// Create a new Spanner client from configuration
    ///
    /// The gcloud-spanner library automatically detects the
    /// SPANNER_EMULATOR_HOST environment variable and connects to
    /// the emulator when set, or production Spanner otherwise.
    ///
    /// The instance, database, and notes table are created first if they
    /// don't exist.
    pub async fn from_settings(settings: &SpannerSettings) -> Result<Self> {
        auto_provision(settings).await?;

        let database_path = settings.database_path();

        if let Some(host) = &settings.emulator_host {
            tracing::info!("Connecting to Spanner emulator at: {}", host);
        } else {
            tracing::info!("Connecting to production Spanner");
        }

        let client = Client::new(&database_path, ClientConfig::default())
            .await
            .context("Failed to create Spanner client")?;

        tracing::info!(
            "Successfully connected to Spanner database: {}",
            database_path
        );

        Ok(Self {
            inner: Arc::new(client),
        })
    }

    /// Insert a new note under a freshly minted id
    ///
    /// Uses a plain insert mutation, so an id collision surfaces as an
    /// error instead of silently overwriting an existing note.
    ///
    /// # Errors
    /// Returns an error if the Spanner operation fails
    pub async fn insert(&self, draft: NoteDraft) -> Result<Note> {
        let note = draft.into_note(NoteId::generate());
        let id_str = note.id.to_string();

        let mutation = insert(
            NOTES_TABLE,
            &["id", "content", "important", "created_at"],
            &[&id_str, &note.content, &note.important, &CommitTimestamp::new()],
        );

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to insert note into Spanner")?;

        tracing::debug!("Inserted note with id: {}", note.id);
        Ok(note)
    }

    /// Read a note by id
    ///
    /// # Returns
    /// * `Ok(Some(note))` - Note found
    /// * `Ok(None)` - No note carries this id
    /// * `Err(_)` - Spanner operation failed
    pub async fn read(&self, id: NoteId) -> Result<Option<Note>> {
        let mut statement = Statement::new(
            "SELECT id, content, important FROM notes WHERE id = @id"
        );
        statement.add_param("id", &id.to_string());

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create read transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to query note from Spanner")?;

        if let Some(row) = result_set.next().await? {
            tracing::debug!("Read note with id: {}", id);
            Ok(Some(note_from_row(&row)?))
        } else {
            tracing::debug!("Note not found with id: {}", id);
            Ok(None)
        }
    }

    /// List every note in creation order
    pub async fn list(&self) -> Result<Vec<Note>> {
        let statement = Statement::new(
            "SELECT id, content, important FROM notes ORDER BY created_at ASC, id ASC"
        );

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create read transaction for list")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to execute list query")?;

        let mut notes = Vec::new();
        while let Some(row) = result_set.next().await? {
            notes.push(note_from_row(&row)?);
        }

        tracing::debug!("Listed {} notes", notes.len());
        Ok(notes)
    }

    /// Delete a note by id
    ///
    /// A delete mutation on an absent key is a no-op in Spanner, so this
    /// succeeds whether or not the note exists.
    pub async fn delete(&self, id: NoteId) -> Result<()> {
        let mutation = delete(NOTES_TABLE, Key::new(&id.to_string()));

        self.inner
            .apply(vec![mutation])
            .await
            .context("Failed to delete note from Spanner")?;

        tracing::debug!("Deleted note with id: {}", id);
        Ok(())
    }

    /// Perform a health check by executing a simple query
    ///
    /// # Errors
    /// Returns an error if the Spanner query fails or if the transaction cannot be created
    pub async fn health_check(&self) -> Result<()> {
        let statement = Statement::new("SELECT 1");

        let mut tx = self.inner
            .single()
            .await
            .context("Failed to create health check transaction")?;

        let mut result_set = tx
            .query(statement)
            .await
            .context("Failed to execute health check query")?;

        if result_set.next().await?.is_some() {
            tracing::debug!("Health check query succeeded");
            Ok(())
        } else {
            Err(anyhow::anyhow!("Health check query returned no results"))
        }
    }

    /// Release the session pool
    ///
    /// Only the last handle can close the client; earlier calls just drop
    /// their reference.
    pub async fn close(self) {
        match Arc::try_unwrap(self.inner) {
            Ok(client) => {
                client.close().await;
                tracing::info!("Spanner client closed");
            }
            Err(_) => tracing::warn!("Spanner client still in use, skipping session cleanup"),
        }
    }
}

fn note_from_row(row: &Row) -> Result<Note> {
    let id_str: String = row.column_by_name("id")?;
    let id = NoteId::parse(&id_str).context("Stored note has a malformed id")?;

    Ok(Note {
        id,
        content: row.column_by_name("content")?,
        important: row.column_by_name("important")?,
    })
}

/// Automatically provision Spanner instance, database, and table
///
/// Enables zero-setup local development with the emulator.
async fn auto_provision(settings: &SpannerSettings) -> Result<()> {
    tracing::info!("Starting auto-provisioning checks...");

    let admin_client = AdminClient::new(AdminClientConfig::default())
        .await
        .context("Failed to create Spanner admin client")?;

    let project_path = format!("projects/{}", settings.project);
    let instance_path = format!("{}/instances/{}", project_path, settings.instance);
    let database_path = settings.database_path();

    ensure_instance_exists(&admin_client, settings, &project_path, &instance_path).await?;
    ensure_database_exists(&admin_client, &instance_path, &database_path).await?;
    ensure_table_exists(&admin_client, &database_path).await?;

    tracing::info!("Auto-provisioning complete");
    Ok(())
}

async fn ensure_instance_exists(
    admin_client: &AdminClient,
    settings: &SpannerSettings,
    project_path: &str,
    instance_path: &str,
) -> Result<()> {
    let get_request = GetInstanceRequest {
        name: instance_path.to_string(),
        field_mask: None,
    };

    match admin_client.instance().get_instance(get_request, None).await {
        Ok(_) => {
            tracing::info!("Instance already exists: {}", instance_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Instance not found, creating: {}", instance_path);

            let instance_config = if settings.emulator_host.is_some() {
                format!("{}/instanceConfigs/emulator-config", project_path)
            } else {
                format!("{}/instanceConfigs/regional-us-central1", project_path)
            };

            let create_request = CreateInstanceRequest {
                parent: project_path.to_string(),
                instance_id: settings.instance.clone(),
                instance: Some(Instance {
                    name: instance_path.to_string(),
                    config: instance_config,
                    display_name: format!("{} instance", settings.instance),
                    node_count: 1,
                    ..Default::default()
                }),
            };

            let mut operation = admin_client
                .instance()
                .create_instance(create_request, None)
                .await
                .context("Failed to start instance creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create instance")?;

            tracing::info!("Instance created successfully: {}", instance_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check instance existence: {}",
            e.message()
        )),
    }
}

async fn ensure_database_exists(
    admin_client: &AdminClient,
    instance_path: &str,
    database_path: &str,
) -> Result<()> {
    let get_request = GetDatabaseRequest {
        name: database_path.to_string(),
    };

    match admin_client
        .database()
        .get_database(get_request, None)
        .await
    {
        Ok(_) => {
            tracing::info!("Database already exists: {}", database_path);
            Ok(())
        }
        Err(status) if status.code() == Code::NotFound => {
            tracing::info!("Database not found, creating: {}", database_path);

            let database_id = database_path
                .split('/')
                .next_back()
                .context("Invalid database path")?;

            let create_request = CreateDatabaseRequest {
                parent: instance_path.to_string(),
                create_statement: format!("CREATE DATABASE `{}`", database_id),
                extra_statements: vec![],
                encryption_config: None,
                database_dialect: 1, // Google Standard SQL
                proto_descriptors: vec![],
            };

            let mut operation = admin_client
                .database()
                .create_database(create_request, None)
                .await
                .context("Failed to start database creation")?;

            operation
                .wait(None)
                .await
                .context("Failed to create database")?;

            tracing::info!("Database created successfully: {}", database_path);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(
            "Failed to check database existence: {}",
            e.message()
        )),
    }
}

async fn ensure_table_exists(admin_client: &AdminClient, database_path: &str) -> Result<()> {
    let get_ddl_request = GetDatabaseDdlRequest {
        database: database_path.to_string(),
    };

    let ddl_response = admin_client
        .database()
        .get_database_ddl(get_ddl_request, None)
        .await
        .context("Failed to get database DDL")?;

    let table_exists = ddl_response
        .into_inner()
        .statements
        .iter()
        .any(|stmt| stmt.contains("CREATE TABLE notes") || stmt.contains("CREATE TABLE `notes`"));

    if table_exists {
        tracing::info!("Table '{}' already exists", NOTES_TABLE);
        return Ok(());
    }

    tracing::info!("Table '{}' not found, creating...", NOTES_TABLE);

    let update_request = UpdateDatabaseDdlRequest {
        database: database_path.to_string(),
        statements: vec![CREATE_NOTES_TABLE.trim().to_string()],
        operation_id: String::new(),
        proto_descriptors: vec![],
        throughput_mode: false,
    };

    let mut operation = admin_client
        .database()
        .update_database_ddl(update_request, None)
        .await
        .context("Failed to start table creation")?;

    operation
        .wait(None)
        .await
        .context("Failed to create table")?;

    tracing::info!("Table '{}' created successfully", NOTES_TABLE);
    Ok(())
}
