//! Service used to load and save Pokemon records. Used by the [Pokemon endpoints](crate::api::pokemon).

use actix_web::web;
use diesel::{
    delete, insert_into, update, ExpressionMethods, NotFound, NullableExpressionMethods, QueryDsl,
    SelectableHelper,
};
use diesel_async::RunQueryDsl;
use log::{debug, info, warn};

use crate::db::{Pool, PooledConnection};
use crate::error::QueryContext;
use crate::models::pokemon::{ImageUpload, NewPokemon, PatchPokemon, Pokemon};
use crate::schema::pokemon;
use crate::storage::{ImageStorage, StoredImage};

/// Service implementation for [`Pokemon`] entities.
///
/// This type contains the actual business logic to fetch/save Pokemon from the database and to
/// move their images to public storage.
#[derive(Clone)]
pub struct Service {
    pool: Pool,
    storage: ImageStorage,
}

impl Service {
    /// Creates a new Pokemon service using the provided database connection [`Pool`] and
    /// [`ImageStorage`].
    pub fn new(pool: Pool, storage: ImageStorage) -> Self {
        Self { pool, storage }
    }

    /// Returns every [`Pokemon`] in the database, ordered by id.
    pub async fn list_pokemon(&self) -> crate::Result<Vec<Pokemon>> {
        let mut connection = self.get_pooled_connection().await?;

        pokemon::table
            .order(pokemon::id)
            .select(Pokemon::as_select())
            .load(&mut connection)
            .await
            .with_query_context(|| "failed to list pokemon")
    }

    /// Returns the [`Pokemon`] with the given ID from the database.
    pub async fn get_pokemon(&self, pokemon_id: i64) -> crate::Result<Pokemon> {
        let mut connection = self.get_pooled_connection().await?;

        pokemon::table
            .find(pokemon_id)
            .select(Pokemon::as_select())
            .first(&mut connection)
            .await
            .with_query_context(|| format!("failed to fetch pokemon with id {}", pokemon_id))
    }

    /// Creates a new [`Pokemon`] and adds it to the database.
    ///
    /// The image is moved to public storage first, then the row is inserted. If the insert fails,
    /// the stored image is removed before the error is returned.
    pub async fn create_pokemon(
        &self,
        new_pokemon: NewPokemon,
        image: ImageUpload,
    ) -> crate::Result<Pokemon> {
        let storage = self.storage.clone();
        let stored_image = web::block(move || storage.store(image)).await??;
        let values = new_pokemon.with_image(stored_image.relative_path.clone());

        let inserted = match self.get_pooled_connection().await {
            Ok(mut connection) => insert_into(pokemon::table)
                .values(&values)
                .returning(Pokemon::as_returning())
                .get_result(&mut connection)
                .await
                .with_query_context(|| "failed to insert new pokemon"),
            Err(err) => Err(err),
        };

        match inserted {
            Ok(created) => {
                info!("Created pokemon {} ({})", created.id, created.image);
                Ok(created)
            },
            Err(err) => {
                if let Err(removal_err) = self.remove_image(stored_image).await {
                    warn!("Failed to remove image after failed insert: {}", removal_err);
                }

                Err(err)
            },
        }
    }

    /// Updates some fields of the [`Pokemon`] with the given ID.
    ///
    /// Only the fields that are specified (e.g. not set to `None`) are overwritten; `updated_at`
    /// is always refreshed.
    pub async fn update_pokemon(
        &self,
        pokemon_id: i64,
        pokemon_patch: &PatchPokemon,
    ) -> crate::Result<Pokemon> {
        if pokemon_patch.is_empty() {
            debug!("Empty patch for pokemon {}; only updated_at will change", pokemon_id);
        }

        let mut connection = self.get_pooled_connection().await?;

        update(pokemon::table.find(pokemon_id))
            .set((pokemon_patch, pokemon::updated_at.eq(diesel::dsl::now.nullable())))
            .returning(Pokemon::as_returning())
            .get_result(&mut connection)
            .await
            .with_query_context(|| format!("failed to update pokemon {}", pokemon_id))
    }

    /// Deletes the Pokemon with the given ID from the database.
    ///
    /// Its image is left in public storage.
    pub async fn delete_pokemon(&self, pokemon_id: i64) -> crate::Result<()> {
        let mut connection = self.get_pooled_connection().await?;

        delete(pokemon::table.find(pokemon_id))
            .execute(&mut connection)
            .await
            .and_then(|deleted_count| if deleted_count > 0 { Ok(()) } else { Err(NotFound) })
            .with_query_context(|| format!("failed to delete pokemon {}", pokemon_id))
    }

    async fn remove_image(&self, image: StoredImage) -> crate::Result<()> {
        let storage = self.storage.clone();
        web::block(move || storage.remove(&image)).await?
    }

    /// Returns a [`PooledConnection`] from our internal database connection pool.
    ///
    /// The connection can then be used to perform DB queries.
    async fn get_pooled_connection(&self) -> crate::Result<PooledConnection> {
        Ok(self.pool.get().await?)
    }
}
