//! REST-backed containers.
//!
//! A [`RestHoneycomb<T>`] holds a `Vec<T>` mirroring a REST collection. Each
//! CRUD call makes one request through its [`Pollen`] client and then folds
//! the response into local state with a single dispatch. Items are matched on
//! the `id_key` field of their JSON form.
//!
//! Calls are not serialized: each one reads the state after its own response
//! arrives, so overlapping calls resolve last-writer-wins.

use std::cell::RefCell;
use std::fmt;

use hive_pollen::Pollen;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::RestError;
use crate::honeycomb::{AsHoneycomb, Honeycomb, State};

/// A container whose state is a list of items kept in sync with a REST
/// endpoint.
///
/// # Example
///
/// ```ignore
/// let todos = RestHoneycomb::<Todo>::new("id", vec![], "https://api.test/todos")?;
/// todos.all().await?;
/// todos.create(&NewTodo { title: "write docs" }).await?;
/// assert_eq!(todos.get_state().len(), 1);
/// ```
pub struct RestHoneycomb<T> {
    honeycomb: Honeycomb<Vec<T>>,
    pollen: RefCell<Pollen>,
    id_key: RefCell<String>,
}

impl<T: fmt::Debug> fmt::Debug for RestHoneycomb<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestHoneycomb")
            .field("id_key", &self.id_key.borrow())
            .field("endpoint", &self.pollen.borrow().base_url().as_str())
            .field("state", &self.honeycomb)
            .finish()
    }
}

impl<T> RestHoneycomb<T>
where
    T: Serialize + DeserializeOwned + State,
{
    /// Create a container talking to `endpoint` through reqwest.
    pub fn new(id_key: &str, initial: Vec<T>, endpoint: &str) -> Result<Self, RestError> {
        Self::with_pollen(id_key, initial, Pollen::new(endpoint)?)
    }

    /// Create a container on top of an existing client.
    ///
    /// `Content-Type: application/json` is added to the client's default
    /// headers.
    pub fn with_pollen(id_key: &str, initial: Vec<T>, mut pollen: Pollen) -> Result<Self, RestError> {
        pollen.set_header("Content-Type", Some("application/json"))?;
        Ok(Self {
            honeycomb: Honeycomb::new(initial),
            pollen: RefCell::new(pollen),
            id_key: RefCell::new(id_key.to_string()),
        })
    }

    /// Change the field items are matched on.
    pub fn set_id_key(&self, id_key: &str) {
        *self.id_key.borrow_mut() = id_key.to_string();
    }

    /// The field items are matched on.
    pub fn id_key(&self) -> String {
        self.id_key.borrow().clone()
    }

    /// A clone of the client; changes to it do not affect this container.
    pub fn pollen(&self) -> Pollen {
        self.pollen.borrow().clone()
    }

    /// Point the client at a new collection URL.
    pub fn set_endpoint(&self, endpoint: &str) -> Result<(), RestError> {
        self.pollen.borrow_mut().set_base_url(endpoint)?;
        Ok(())
    }

    /// Set a default header on the client; `None` removes it.
    pub fn set_header(&self, name: &str, value: Option<&str>) -> Result<(), RestError> {
        self.pollen.borrow_mut().set_header(name, value)?;
        Ok(())
    }

    /// The live list, without copying.
    pub fn get_state(&self) -> std::rc::Rc<Vec<T>> {
        self.honeycomb.get_state()
    }

    /// An independent copy of the list.
    pub fn copy_state(&self) -> Vec<T> {
        self.honeycomb.copy_state()
    }

    fn id_of(&self, item: &T) -> Result<JsonValue, RestError> {
        let value = serde_json::to_value(item)?;
        let key = self.id_key.borrow();
        Ok(value.get(key.as_str()).cloned().unwrap_or(JsonValue::Null))
    }

    fn position(&self, items: &[T], id: &JsonValue) -> Result<Option<usize>, RestError> {
        for (index, item) in items.iter().enumerate() {
            if self.id_of(item)? == *id {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Fetch the whole collection and replace local state with it.
    pub async fn all(&self) -> Result<Vec<T>, RestError> {
        let pollen = self.pollen();
        let items: Vec<T> = pollen.get("/").await?;
        self.honeycomb.dispatch(items.clone());
        Ok(items)
    }

    /// Fetch one item, replacing the local item with the same id in place or
    /// appending it.
    pub async fn get(&self, id: impl Into<JsonValue>) -> Result<T, RestError> {
        let id = id.into();
        let pollen = self.pollen();
        let item: T = pollen.get(&item_path(&id)).await?;

        let mut items = self.honeycomb.copy_state();
        match self.position(&items, &id)? {
            Some(index) => items[index] = item.clone(),
            None => items.push(item.clone()),
        }
        self.honeycomb.dispatch(items);
        Ok(item)
    }

    /// Create an item and append the server's version of it.
    pub async fn create<B>(&self, data: &B) -> Result<T, RestError>
    where
        B: Serialize + ?Sized,
    {
        let pollen = self.pollen();
        let item: T = pollen.post_json("/", data).await?;

        let mut items = self.honeycomb.copy_state();
        items.push(item.clone());
        self.honeycomb.dispatch(items);
        Ok(item)
    }

    /// Replace an item on the server and locally.
    ///
    /// `data` must carry its id; a missing or null id fails before any
    /// request is made. The local item replaced is the one matching the id of
    /// the item the server returns.
    pub async fn update(&self, data: &T) -> Result<T, RestError> {
        let id = self.id_of(data)?;
        if id.is_null() {
            return Err(RestError::MissingId { key: self.id_key() });
        }
        let pollen = self.pollen();
        let item: T = pollen.put_json(&item_path(&id), data).await?;

        let returned_id = self.id_of(&item)?;
        let mut items = self.honeycomb.copy_state();
        if let Some(index) = self.position(&items, &returned_id)? {
            items[index] = item.clone();
        }
        self.honeycomb.dispatch(items);
        Ok(item)
    }

    /// Delete an item on the server and drop it locally.
    ///
    /// Returns the server's response body.
    pub async fn delete(&self, id: impl Into<JsonValue>) -> Result<JsonValue, RestError> {
        let id = id.into();
        let pollen = self.pollen();
        let response: JsonValue = pollen.delete(&item_path(&id)).await?;

        let items = self.honeycomb.copy_state();
        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            if self.id_of(&item)? != id {
                kept.push(item);
            }
        }
        self.honeycomb.dispatch(kept);
        Ok(response)
    }
}

impl<T: State> AsHoneycomb for RestHoneycomb<T> {
    type State = Vec<T>;

    fn honeycomb(&self) -> &Honeycomb<Vec<T>> {
        &self.honeycomb
    }
}

/// `/{id}`, with string ids written without quotes.
fn item_path(id: &JsonValue) -> String {
    match id {
        JsonValue::String(s) => format!("/{}", s),
        other => format!("/{}", other),
    }
}
