use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
    Set, sea_query::NullOrdering,
};
use tracing::debug;

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{Movie, MovieChanges, MovieFilter, MovieInput, SortField, SortOrder},
};

#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, filter: &MovieFilter) -> AppResult<Vec<Movie>> {
        let mut query = movie::Entity::find();
        if let Some(watched) = filter.watched {
            query = query.filter(movie::Column::Watched.eq(watched));
        }

        let sort = filter.sort.unwrap_or_default();
        let order = match sort.order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        query = match sort.field {
            // Unrated movies go last in either direction.
            SortField::Rating => {
                query.order_by_with_nulls(movie::Column::Rating, order.clone(), NullOrdering::Last)
            },
            field => query.order_by(column_for(field), order.clone()),
        };
        let rows = query.order_by(movie::Column::Id, order).all(&self.db).await?;

        debug!(count = rows.len(), watched = ?filter.watched, sort = ?sort, "listed movies");
        rows.into_iter().map(|row| Movie::try_from(row).map_err(AppError::from)).collect()
    }

    pub async fn get(&self, id: &str) -> AppResult<Movie> {
        let row = self.find(id).await?;
        Ok(Movie::try_from(row)?)
    }

    pub async fn create(&self, input: MovieInput) -> AppResult<Movie> {
        let model = movie::ActiveModel {
            id: Set(uuid::Uuid::now_v7().to_string()),
            title: Set(input.title),
            year: Set(input.year),
            genre: Set(input.genre),
            watched: Set(input.watched),
            rating: Set(input.rating),
            created_at: Set(now_millis()),
        };
        let row = model.insert(&self.db).await?;
        debug!(id = %row.id, title = %row.title, "created movie");
        Ok(Movie::try_from(row)?)
    }

    pub async fn replace(&self, id: &str, input: MovieInput) -> AppResult<Movie> {
        let mut model: movie::ActiveModel = self.find(id).await?.into();
        model.title = Set(input.title);
        model.year = Set(input.year);
        model.genre = Set(input.genre);
        model.watched = Set(input.watched);
        model.rating = Set(input.rating);

        let row = model.update(&self.db).await?;
        debug!(id = %row.id, "replaced movie");
        Ok(Movie::try_from(row)?)
    }

    pub async fn update(&self, id: &str, changes: MovieChanges) -> AppResult<Movie> {
        let row = self.find(id).await?;
        let mut model: movie::ActiveModel = row.clone().into();
        if let Some(title) = changes.title {
            model.title = Set(title);
        }
        if let Some(year) = changes.year {
            model.year = Set(year);
        }
        if let Some(genre) = changes.genre {
            model.genre = Set(genre);
        }
        if let Some(watched) = changes.watched {
            model.watched = Set(watched);
        }
        if let Some(rating) = changes.rating {
            model.rating = Set(rating);
        }

        if !model.is_changed() {
            return Ok(Movie::try_from(row)?);
        }

        let row = model.update(&self.db).await?;
        debug!(id = %row.id, watched = row.watched, "updated movie");
        Ok(Movie::try_from(row)?)
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let result = movie::Entity::delete_by_id(id.to_string()).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        debug!(id = %id, "deleted movie");
        Ok(())
    }

    async fn find(&self, id: &str) -> AppResult<movie::Model> {
        movie::Entity::find_by_id(id.to_string()).one(&self.db).await?.ok_or(AppError::NotFound)
    }
}

fn column_for(field: SortField) -> movie::Column {
    match field {
        SortField::Title => movie::Column::Title,
        SortField::Year => movie::Column::Year,
        SortField::Genre => movie::Column::Genre,
        SortField::Watched => movie::Column::Watched,
        SortField::Rating => movie::Column::Rating,
        SortField::CreatedAt => movie::Column::CreatedAt,
    }
}

fn now_millis() -> i64 {
    jiff::Timestamp::now().as_millisecond()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, models::SortSpec};

    async fn store() -> MovieStore {
        MovieStore::new(db::connect_and_migrate("sqlite::memory:").await.unwrap())
    }

    fn input(title: &str, year: i32, rating: Option<f64>) -> MovieInput {
        MovieInput {
            title: title.to_string(),
            year,
            genre: "Drama".to_string(),
            watched: false,
            rating,
        }
    }

    #[tokio::test]
    async fn create_then_list_contains_record_once() {
        let store = store().await;
        let created = store.create(input("Alien", 1979, None)).await.unwrap();

        let all = store.list(&MovieFilter::all()).await.unwrap();
        let matches: Vec<_> = all.iter().filter(|m| m.id == created.id).collect();
        assert_eq!(matches.len(), 1);
        assert!(!matches[0].watched);
        assert_eq!(matches[0].rating, None);
    }

    #[tokio::test]
    async fn zero_rating_is_stored_as_zero() {
        let store = store().await;
        let created = store.create(input("Cats", 2019, Some(0.0))).await.unwrap();
        assert_eq!(store.get(&created.id).await.unwrap().rating, Some(0.0));
    }

    #[tokio::test]
    async fn watched_filter_narrows_results() {
        let store = store().await;
        let seen = store.create(MovieInput { watched: true, ..input("Seen", 2000, None) }).await;
        let pending = store.create(input("Pending", 2001, None)).await;
        let (seen, pending) = (seen.unwrap(), pending.unwrap());

        let watched = store.list(&MovieFilter::watched(true)).await.unwrap();
        assert_eq!(watched.iter().map(|m| &m.id).collect::<Vec<_>>(), vec![&seen.id]);

        let unwatched = store.list(&MovieFilter::watched(false)).await.unwrap();
        assert_eq!(unwatched.iter().map(|m| &m.id).collect::<Vec<_>>(), vec![&pending.id]);

        assert_eq!(store.list(&MovieFilter::all()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn default_order_is_newest_first() {
        let store = store().await;
        let first = store.create(input("First", 2000, None)).await.unwrap();
        let second = store.create(input("Second", 2000, None)).await.unwrap();

        let all = store.list(&MovieFilter::all()).await.unwrap();
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);
    }

    #[tokio::test]
    async fn sorts_by_requested_field() {
        let store = store().await;
        for (title, rating) in [("Zeta", Some(5.0)), ("Alpha", None), ("Mu", Some(9.0))] {
            store.create(input(title, 2000, rating)).await.unwrap();
        }

        let by_title = MovieFilter {
            watched: None,
            sort: Some(SortSpec { field: SortField::Title, order: SortOrder::Asc }),
        };
        let titles: Vec<_> =
            store.list(&by_title).await.unwrap().into_iter().map(|m| m.title).collect();
        assert_eq!(titles, ["Alpha", "Mu", "Zeta"]);

        for order in [SortOrder::Asc, SortOrder::Desc] {
            let by_rating = MovieFilter {
                watched: None,
                sort: Some(SortSpec { field: SortField::Rating, order }),
            };
            let listed = store.list(&by_rating).await.unwrap();
            assert_eq!(listed.last().unwrap().title, "Alpha");
        }
    }

    #[tokio::test]
    async fn partial_update_changes_only_given_fields() {
        let store = store().await;
        let created = store.create(input("Alien", 1979, Some(8.5))).await.unwrap();

        let changes = MovieChanges { watched: Some(true), ..Default::default() };
        let updated = store.update(&created.id, changes).await.unwrap();

        assert!(updated.watched);
        assert_eq!(updated, Movie { watched: true, ..created });
    }

    #[tokio::test]
    async fn replace_clears_absent_rating() {
        let store = store().await;
        let created = store.create(input("Alien", 1979, Some(8.5))).await.unwrap();

        let replaced = store.replace(&created.id, input("Aliens", 1986, None)).await.unwrap();
        assert_eq!(replaced.title, "Aliens");
        assert_eq!(replaced.year, 1986);
        assert_eq!(replaced.rating, None);
        assert_eq!(replaced.created_at, created.created_at);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let store = store().await;
        assert!(matches!(store.get("missing").await, Err(AppError::NotFound)));
        assert!(matches!(
            store.replace("missing", input("A", 2000, None)).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            store.update("missing", MovieChanges::default()).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_is_final() {
        let store = store().await;
        let created = store.create(input("Alien", 1979, None)).await.unwrap();

        store.delete(&created.id).await.unwrap();
        let all = store.list(&MovieFilter::all()).await.unwrap();
        assert!(all.iter().all(|m| m.id != created.id));
        assert!(matches!(store.delete(&created.id).await, Err(AppError::NotFound)));
    }
}
