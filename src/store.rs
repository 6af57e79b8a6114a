//! The in-memory movie collection.
//!
//! An ordered `Vec<Movie>` behind an `RwLock`. Every operation is a linear
//! scan; the collection is small and lives for the whole process. Each
//! mutation holds the write lock across its find-and-modify step, so
//! concurrent requests never lose an update.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::movie::{Movie, MoviePatch, NewMovie};
use crate::validate::validate_full;

/// Seed bundled into the binary, used when no `seed_path` is configured.
const BUILTIN_SEED: &str = include_str!("../data/movies.json");

/// No record with the requested id.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
#[error("Movie not found")]
pub struct NotFound;

#[derive(Debug, Default)]
pub struct MovieStore {
    movies: RwLock<Vec<Movie>>,
}

impl MovieStore {
    /// Wraps an initial collection. Ids must be unique.
    pub fn new(movies: Vec<Movie>) -> Result<Self> {
        {
            let mut seen = HashSet::with_capacity(movies.len());
            if let Some(dup) = movies.iter().find(|m| !seen.insert(m.id.as_str())) {
                return Err(Error::DuplicateId(dup.id.clone()));
            }
        }
        Ok(Self { movies: RwLock::new(movies) })
    }

    /// Loads a JSON array of movie records. Each record needs a string `id`
    /// and must satisfy the full schema.
    pub fn from_seed_json(json: &str) -> Result<Self> {
        let records: Vec<Value> = serde_json::from_str(json)?;
        let movies = records
            .iter()
            .enumerate()
            .map(|(index, record)| -> Result<Movie> {
                let id = record
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or(Error::SeedMissingId { index })?;
                let movie = validate_full(record)
                    .map_err(|source| Error::SeedRecord { index, source })?;
                Ok(movie.into_movie(id.to_owned()))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(movies)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_seed_json(&json)
    }

    /// The collection shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_seed_json(BUILTIN_SEED)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Every record, in insertion order.
    pub fn list(&self) -> Vec<Movie> {
        self.read().clone()
    }

    /// Records with at least one genre equal to `genre`, ignoring case.
    pub fn filter_by_genre(&self, genre: &str) -> Vec<Movie> {
        self.read().iter().filter(|m| m.has_genre(genre)).cloned().collect()
    }

    pub fn find_by_id(&self, id: &str) -> Option<Movie> {
        self.read().iter().find(|m| m.id == id).cloned()
    }

    /// Appends a record under a fresh UUID and returns what was stored.
    pub fn insert(&self, new: NewMovie) -> Movie {
        let movie = new.into_movie(Uuid::new_v4().to_string());
        self.write().push(movie.clone());
        movie
    }

    /// Removes a record; the remaining ones keep their order.
    pub fn delete_by_id(&self, id: &str) -> Result<(), NotFound> {
        let mut movies = self.write();
        let index = movies.iter().position(|m| m.id == id).ok_or(NotFound)?;
        movies.remove(index);
        Ok(())
    }

    /// Overlays `patch` onto a record in place and returns the merged record.
    pub fn patch_by_id(&self, id: &str, patch: MoviePatch) -> Result<Movie, NotFound> {
        let mut movies = self.write();
        let movie = movies.iter_mut().find(|m| m.id == id).ok_or(NotFound)?;
        movie.apply(patch);
        Ok(movie.clone())
    }

    // A panic mid-operation cannot leave the vector half-written, so a
    // poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Movie>> {
        self.movies.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Movie>> {
        self.movies.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::movie::Genre;

    fn new_movie(title: &str, genre: Vec<Genre>) -> NewMovie {
        NewMovie {
            title: title.into(),
            year: 2020,
            director: "D".into(),
            duration: 100,
            rate: 5.0,
            poster: "http://x.com/p.jpg".into(),
            genre,
        }
    }

    fn store() -> MovieStore {
        let store = MovieStore::default();
        store.insert(new_movie("Alpha", vec![Genre::Comedy]));
        store.insert(new_movie("Beta", vec![Genre::Drama, Genre::Crime]));
        store.insert(new_movie("Gamma", vec![Genre::Comedy, Genre::Drama]));
        store
    }

    fn titles(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[test]
    fn insert_assigns_unique_ids_and_appends() {
        let store = store();
        let created = store.insert(new_movie("Delta", vec![Genre::Horror]));

        assert_eq!(store.len(), 4);
        assert_eq!(store.list().last(), Some(&created));
        assert_eq!(store.find_by_id(&created.id), Some(created.clone()));

        let ids: HashSet<String> = store.list().into_iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), 4);
        assert!(Uuid::parse_str(&created.id).is_ok());
    }

    #[test]
    fn filter_by_genre_ignores_case() {
        let store = store();
        assert_eq!(titles(&store.filter_by_genre("comedy")), ["Alpha", "Gamma"]);
        assert_eq!(titles(&store.filter_by_genre("DRAMA")), ["Beta", "Gamma"]);
        assert!(store.filter_by_genre("western").is_empty());
    }

    #[test]
    fn delete_preserves_order_of_the_rest() {
        let store = store();
        let beta = store.list()[1].id.clone();

        assert_eq!(store.delete_by_id(&beta), Ok(()));
        assert_eq!(titles(&store.list()), ["Alpha", "Gamma"]);
        assert_eq!(store.find_by_id(&beta), None);
        assert_eq!(store.delete_by_id(&beta), Err(NotFound));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn patch_changes_only_given_fields() {
        let store = store();
        let before = store.list()[0].clone();

        let after = store
            .patch_by_id(&before.id, MoviePatch { year: Some(1999), ..Default::default() })
            .unwrap();

        assert_eq!(after, Movie { year: 1999, ..before.clone() });
        assert_eq!(store.list()[0], after);
        assert_eq!(store.patch_by_id("missing", MoviePatch::default()), Err(NotFound));
    }

    #[test]
    fn concurrent_inserts_are_all_kept() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 50;

        let store = std::sync::Arc::new(MovieStore::default());
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        store.insert(new_movie(&format!("{t}-{i}"), vec![Genre::Drama]));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), THREADS * PER_THREAD);
        let ids: HashSet<String> = store.list().into_iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), THREADS * PER_THREAD);
    }

    #[test]
    fn builtin_seed_loads() {
        let store = MovieStore::builtin().unwrap();
        assert!(!store.is_empty());
    }

    #[test]
    fn seed_records_are_validated() {
        let record = json!({
            "id": "a",
            "title": "T",
            "year": 2001,
            "director": "D",
            "duration": 90,
            "rate": 7.1,
            "poster": "https://img.example/a.jpg",
            "genre": ["Drama"]
        });

        let ok = MovieStore::from_seed_json(&json!([record]).to_string()).unwrap();
        assert_eq!(ok.find_by_id("a").map(|m| m.rate), Some(7.1));

        let dup = MovieStore::from_seed_json(&json!([record, record]).to_string());
        assert!(matches!(dup, Err(Error::DuplicateId(id)) if id == "a"));

        let mut no_id = record.clone();
        no_id.as_object_mut().unwrap().remove("id");
        let err = MovieStore::from_seed_json(&json!([record, no_id]).to_string());
        assert!(matches!(err, Err(Error::SeedMissingId { index: 1 })));

        let mut bad = record.clone();
        bad["year"] = json!(1800);
        let err = MovieStore::from_seed_json(&json!([bad]).to_string());
        assert!(matches!(err, Err(Error::SeedRecord { index: 0, .. })));

        assert!(matches!(MovieStore::from_seed_json("{}"), Err(Error::SeedJson(_))));
    }
}
