use crate::core::errors::CareLinkError;
use crate::core::models::{
    doctor::{Doctor, DoctorCriteria, NewDoctor, Specialty, UserDoctor},
    patient::{NewPatient, Patient, UserPatient},
    user::{NewUser, User, UserRole, UserUpdate},
};
use crate::core::pagination::PageRequest;
use crate::infrastructure::storage::{AssociationRepository, DoctorRepository, PatientRepository, UserRepository};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::str::FromStr;
use tracing::{error, info};

const USER_SELECT: &str = "SELECT id, username, email, password, firstname, lastname, user_role, \
     inserted_at, modified_at FROM users";

const PATIENT_SELECT: &str = "SELECT u.id AS u_id, u.username, u.email, u.password, u.firstname, u.lastname, \
     u.user_role, u.inserted_at AS u_inserted_at, u.modified_at AS u_modified_at, \
     p.id AS p_id, p.amka, p.city, p.address, p.phone_number, \
     p.inserted_at AS p_inserted_at, p.modified_at AS p_modified_at \
     FROM patients p JOIN users u ON u.id = p.user_id";

const DOCTOR_SELECT: &str = "SELECT u.id AS u_id, u.username, u.email, u.password, u.firstname, u.lastname, \
     u.user_role, u.inserted_at AS u_inserted_at, u.modified_at AS u_modified_at, \
     d.id AS d_id, d.afm, d.city, d.address, d.phone_number, d.specialty, \
     d.inserted_at AS d_inserted_at, d.modified_at AS d_modified_at \
     FROM doctors d JOIN users u ON u.id = d.user_id";

fn decode_column<T: FromStr<Err = CareLinkError>>(row: &SqliteRow, column: &str) -> sqlx::Result<T> {
    let raw: String = row.try_get(column)?;
    raw.parse::<T>().map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn user_from_row(row: &SqliteRow) -> sqlx::Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        firstname: row.try_get("firstname")?,
        lastname: row.try_get("lastname")?,
        role: decode_column::<UserRole>(row, "user_role")?,
        inserted_at: row.try_get("inserted_at")?,
        modified_at: row.try_get("modified_at")?,
    })
}

fn joined_user_from_row(row: &SqliteRow) -> sqlx::Result<User> {
    Ok(User {
        id: row.try_get("u_id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password: row.try_get("password")?,
        firstname: row.try_get("firstname")?,
        lastname: row.try_get("lastname")?,
        role: decode_column::<UserRole>(row, "user_role")?,
        inserted_at: row.try_get("u_inserted_at")?,
        modified_at: row.try_get("u_modified_at")?,
    })
}

fn user_patient_from_row(row: &SqliteRow) -> sqlx::Result<UserPatient> {
    let user = joined_user_from_row(row)?;
    let patient = Patient {
        id: row.try_get("p_id")?,
        user_id: user.id,
        amka: row.try_get("amka")?,
        city: row.try_get("city")?,
        address: row.try_get("address")?,
        phone_number: row.try_get("phone_number")?,
        inserted_at: row.try_get("p_inserted_at")?,
        modified_at: row.try_get("p_modified_at")?,
    };
    Ok(UserPatient { user, patient })
}

fn user_doctor_from_row(row: &SqliteRow) -> sqlx::Result<UserDoctor> {
    let user = joined_user_from_row(row)?;
    let doctor = Doctor {
        id: row.try_get("d_id")?,
        user_id: user.id,
        afm: row.try_get("afm")?,
        city: row.try_get("city")?,
        address: row.try_get("address")?,
        phone_number: row.try_get("phone_number")?,
        specialty: decode_column::<Specialty>(row, "specialty")?,
        inserted_at: row.try_get("d_inserted_at")?,
        modified_at: row.try_get("d_modified_at")?,
    };
    Ok(UserDoctor { user, doctor })
}

/// Escapes LIKE wildcards so user input only ever matches literally, then appends `%`.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_criteria(qb: &mut QueryBuilder<'_, Sqlite>, criteria: &DoctorCriteria) {
    qb.push(" WHERE 1 = 1");
    if let Some(lastname) = &criteria.lastname_prefix {
        qb.push(" AND u.lastname LIKE ")
            .push_bind(like_prefix(lastname))
            .push(" ESCAPE '\\'");
    }
    if let Some(city) = &criteria.city_prefix {
        qb.push(" AND d.city LIKE ")
            .push_bind(like_prefix(city))
            .push(" ESCAPE '\\'");
    }
    if let Some(specialty) = criteria.specialty {
        qb.push(" AND d.specialty = ").push_bind(specialty.as_str());
    }
}

#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Opens the pool and applies the embedded migrations.
    pub async fn connect(database_url: &str) -> Result<Self, CareLinkError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        // An in-memory database lives only as long as its single connection.
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            error!("Migration failed: {}", e);
            CareLinkError::DatabaseError(format!("Migration failed: {}", e))
        })?;
        info!("Connected to database, migrations applied");

        Ok(SqliteStorage { pool })
    }

    async fn fetch_patient(&self, clause: &str, value: impl Into<BindValue>) -> Result<Option<UserPatient>, CareLinkError> {
        let sql = format!("{} WHERE {}", PATIENT_SELECT, clause);
        let value: BindValue = value.into();
        let row = value.bind_to(sqlx::query(&sql)).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(user_patient_from_row).transpose()?)
    }

    async fn fetch_doctor(&self, clause: &str, value: impl Into<BindValue>) -> Result<Option<UserDoctor>, CareLinkError> {
        let sql = format!("{} WHERE {}", DOCTOR_SELECT, clause);
        let value: BindValue = value.into();
        let row = value.bind_to(sqlx::query(&sql)).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(user_doctor_from_row).transpose()?)
    }

    async fn fetch_user(&self, clause: &str, value: impl Into<BindValue>) -> Result<Option<User>, CareLinkError> {
        let sql = format!("{} WHERE {}", USER_SELECT, clause);
        let value: BindValue = value.into();
        let row = value.bind_to(sqlx::query(&sql)).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(user_from_row).transpose()?)
    }
}

/// Single lookup key for the `fetch_*` helpers.
enum BindValue {
    Id(i64),
    Text(String),
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        BindValue::Id(v)
    }
}

impl From<&str> for BindValue {
    fn from(v: &str) -> Self {
        BindValue::Text(v.to_string())
    }
}

impl BindValue {
    fn bind_to<'q>(
        self,
        query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        match self {
            BindValue::Id(v) => query.bind(v),
            BindValue::Text(v) => query.bind(v),
        }
    }
}

async fn insert_user(tx: &mut sqlx::SqliteConnection, user: &NewUser) -> Result<i64, CareLinkError> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO users (username, email, password, firstname, lastname, user_role, inserted_at, modified_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.firstname)
    .bind(&user.lastname)
    .bind(user.role.to_string())
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    Ok(result.last_insert_rowid())
}

async fn update_user_row(tx: &mut sqlx::SqliteConnection, user_id: i64, update: &UserUpdate) -> Result<(), CareLinkError> {
    let result = sqlx::query(
        "UPDATE users SET username = ?, email = ?, firstname = ?, lastname = ?, modified_at = ? WHERE id = ?",
    )
    .bind(&update.username)
    .bind(&update.email)
    .bind(&update.firstname)
    .bind(&update.lastname)
    .bind(Utc::now())
    .bind(user_id)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(CareLinkError::not_found("User", format!("User with id {} wasn't found", user_id)));
    }
    Ok(())
}

#[async_trait]
impl UserRepository for SqliteStorage {
    async fn get_user(&self, user_id: i64) -> Result<Option<User>, CareLinkError> {
        self.fetch_user("id = ?", user_id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, CareLinkError> {
        self.fetch_user("username = ?", username).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, CareLinkError> {
        self.fetch_user("email = ?", email).await
    }
}

#[async_trait]
impl PatientRepository for SqliteStorage {
    async fn create_patient_user(&self, user: NewUser, patient: NewPatient) -> Result<UserPatient, CareLinkError> {
        let mut tx = self.pool.begin().await?;
        let user_id = insert_user(&mut tx, &user).await?;
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO patients (amka, city, address, phone_number, user_id, inserted_at, modified_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&patient.amka)
        .bind(&patient.city)
        .bind(&patient.address)
        .bind(&patient.phone_number)
        .bind(user_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.fetch_patient("u.id = ?", user_id)
            .await?
            .ok_or_else(|| CareLinkError::InternalServerError("Inserted patient not readable".to_string()))
    }

    async fn get_patient_by_user_id(&self, user_id: i64) -> Result<Option<UserPatient>, CareLinkError> {
        self.fetch_patient("u.id = ?", user_id).await
    }

    async fn get_patient_by_amka(&self, amka: &str) -> Result<Option<UserPatient>, CareLinkError> {
        self.fetch_patient("p.amka = ?", amka).await
    }

    async fn update_patient_profile(&self, user_id: i64, update: &UserUpdate) -> Result<UserPatient, CareLinkError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE patients SET city = ?, address = ?, phone_number = ?, modified_at = ? WHERE user_id = ?",
        )
        .bind(&update.city)
        .bind(&update.address)
        .bind(&update.phone_number)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CareLinkError::not_found(
                "Patient",
                format!("Patient with user id {} wasn't found", user_id),
            ));
        }
        update_user_row(&mut tx, user_id, update).await?;
        tx.commit().await?;

        self.fetch_patient("u.id = ?", user_id)
            .await?
            .ok_or_else(|| CareLinkError::InternalServerError("Updated patient not readable".to_string()))
    }

    async fn count_patient_doctors(&self, patient_user_id: i64) -> Result<i64, CareLinkError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM patients_doctors pd JOIN patients p ON p.id = pd.patient_id WHERE p.user_id = ?",
        )
        .bind(patient_user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn get_patient_doctors_page(
        &self,
        patient_user_id: i64,
        page: PageRequest,
    ) -> Result<Vec<UserDoctor>, CareLinkError> {
        let sql = format!(
            "{} JOIN patients_doctors pd ON pd.doctor_id = d.id JOIN patients p ON p.id = pd.patient_id \
             WHERE p.user_id = ? ORDER BY d.id LIMIT ? OFFSET ?",
            DOCTOR_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(patient_user_id)
            .bind(page.page_size())
            .bind(page.skip())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(user_doctor_from_row).collect::<sqlx::Result<Vec<_>>>()?)
    }
}

#[async_trait]
impl DoctorRepository for SqliteStorage {
    async fn create_doctor_user(&self, user: NewUser, doctor: NewDoctor) -> Result<UserDoctor, CareLinkError> {
        let mut tx = self.pool.begin().await?;
        let user_id = insert_user(&mut tx, &user).await?;
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO doctors (afm, city, address, phone_number, specialty, user_id, inserted_at, modified_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&doctor.afm)
        .bind(&doctor.city)
        .bind(&doctor.address)
        .bind(&doctor.phone_number)
        .bind(doctor.specialty.as_str())
        .bind(user_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.fetch_doctor("u.id = ?", user_id)
            .await?
            .ok_or_else(|| CareLinkError::InternalServerError("Inserted doctor not readable".to_string()))
    }

    async fn get_doctor_by_user_id(&self, user_id: i64) -> Result<Option<UserDoctor>, CareLinkError> {
        self.fetch_doctor("u.id = ?", user_id).await
    }

    async fn get_doctor_by_afm(&self, afm: &str) -> Result<Option<UserDoctor>, CareLinkError> {
        self.fetch_doctor("d.afm = ?", afm).await
    }

    async fn get_doctor_by_phone_number(&self, phone_number: &str) -> Result<Option<UserDoctor>, CareLinkError> {
        self.fetch_doctor("d.phone_number = ?", phone_number).await
    }

    async fn update_doctor_profile(&self, user_id: i64, update: &UserUpdate) -> Result<UserDoctor, CareLinkError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE doctors SET city = ?, address = ?, phone_number = ?, modified_at = ? WHERE user_id = ?",
        )
        .bind(&update.city)
        .bind(&update.address)
        .bind(&update.phone_number)
        .bind(Utc::now())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CareLinkError::not_found(
                "Doctor",
                format!("Doctor with user id {} wasn't found", user_id),
            ));
        }
        update_user_row(&mut tx, user_id, update).await?;
        tx.commit().await?;

        self.fetch_doctor("u.id = ?", user_id)
            .await?
            .ok_or_else(|| CareLinkError::InternalServerError("Updated doctor not readable".to_string()))
    }

    async fn count_doctor_patients(&self, doctor_user_id: i64) -> Result<i64, CareLinkError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM patients_doctors pd JOIN doctors d ON d.id = pd.doctor_id WHERE d.user_id = ?",
        )
        .bind(doctor_user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn get_doctor_patients_page(
        &self,
        doctor_user_id: i64,
        page: PageRequest,
    ) -> Result<Vec<UserPatient>, CareLinkError> {
        let sql = format!(
            "{} JOIN patients_doctors pd ON pd.patient_id = p.id JOIN doctors d ON d.id = pd.doctor_id \
             WHERE d.user_id = ? ORDER BY p.id LIMIT ? OFFSET ?",
            PATIENT_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(doctor_user_id)
            .bind(page.page_size())
            .bind(page.skip())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(user_patient_from_row).collect::<sqlx::Result<Vec<_>>>()?)
    }

    async fn count_doctors_filtered(&self, criteria: &DoctorCriteria) -> Result<i64, CareLinkError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM doctors d JOIN users u ON u.id = d.user_id");
        push_criteria(&mut qb, criteria);
        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn get_doctors_filtered_page(
        &self,
        criteria: &DoctorCriteria,
        page: PageRequest,
    ) -> Result<Vec<UserDoctor>, CareLinkError> {
        let mut qb = QueryBuilder::<Sqlite>::new(DOCTOR_SELECT);
        push_criteria(&mut qb, criteria);
        qb.push(" ORDER BY d.id LIMIT ")
            .push_bind(page.page_size())
            .push(" OFFSET ")
            .push_bind(page.skip());
        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(user_doctor_from_row).collect::<sqlx::Result<Vec<_>>>()?)
    }
}

#[async_trait]
impl AssociationRepository for SqliteStorage {
    async fn association_exists(&self, patient_user_id: i64, doctor_user_id: i64) -> Result<bool, CareLinkError> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM patients_doctors pd \
             JOIN patients p ON p.id = pd.patient_id JOIN doctors d ON d.id = pd.doctor_id \
             WHERE p.user_id = ? AND d.user_id = ?",
        )
        .bind(patient_user_id)
        .bind(doctor_user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(found > 0)
    }

    async fn add_association(&self, patient_user_id: i64, doctor_user_id: i64) -> Result<(), CareLinkError> {
        let result = sqlx::query(
            "INSERT INTO patients_doctors (doctor_id, patient_id) \
             SELECT d.id, p.id FROM doctors d, patients p WHERE d.user_id = ? AND p.user_id = ?",
        )
        .bind(doctor_user_id)
        .bind(patient_user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| match CareLinkError::from(e) {
            CareLinkError::EntityAlreadyExists { .. } => CareLinkError::already_exists(
                "Doctor",
                format!("Doctor with user id {} already added to my doctors", doctor_user_id),
            ),
            other => other,
        })?;
        if result.rows_affected() == 0 {
            return Err(CareLinkError::not_found(
                "Association",
                format!(
                    "Patient with user id {} or doctor with user id {} wasn't found",
                    patient_user_id, doctor_user_id
                ),
            ));
        }
        Ok(())
    }

    async fn remove_association(&self, patient_user_id: i64, doctor_user_id: i64) -> Result<bool, CareLinkError> {
        let result = sqlx::query(
            "DELETE FROM patients_doctors \
             WHERE doctor_id = (SELECT id FROM doctors WHERE user_id = ?) \
             AND patient_id = (SELECT id FROM patients WHERE user_id = ?)",
        )
        .bind(doctor_user_id)
        .bind(patient_user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::like_prefix;

    #[test]
    fn like_prefix_escapes_wildcards() {
        assert_eq!(like_prefix("Pap"), "Pap%");
        assert_eq!(like_prefix("50%_off\\"), "50\\%\\_off\\\\%");
    }
}
