use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, QueryOrder, prelude::*};

use crate::{EngineError, Person, ResultEngine, people};

use super::{Engine, normalize_optional_text, normalize_required_text};

impl Engine {
    /// Registers a new person.
    pub async fn new_person(&self, name: &str, phone: Option<&str>) -> ResultEngine<Person> {
        let name = normalize_required_text(name, "name")?;
        let phone = normalize_optional_text(phone);

        let model = people::ActiveModel {
            name: ActiveValue::Set(name),
            phone: ActiveValue::Set(phone),
            created_at: ActiveValue::Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.database)
        .await?;

        Ok(model.into())
    }

    /// Returns every person, ordered by name.
    pub async fn people(&self) -> ResultEngine<Vec<Person>> {
        let models = people::Entity::find()
            .order_by_asc(people::Column::Name)
            .order_by_asc(people::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Person::from).collect())
    }

    pub async fn person(&self, person_id: i32) -> ResultEngine<Person> {
        let model = require_person(&self.database, person_id).await?;
        Ok(model.into())
    }
}

pub(super) async fn require_person<C: ConnectionTrait>(
    db: &C,
    person_id: i32,
) -> ResultEngine<people::Model> {
    people::Entity::find_by_id(person_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("person {person_id}")))
}
