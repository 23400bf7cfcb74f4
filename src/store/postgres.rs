use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{Store, StoreError};
use crate::{
    ledger,
    models::{
        FundType, MaintenanceRequest, NewTransaction, Transaction, TransactionFilter, Unit, UnitRef,
    },
};

#[derive(Clone)]
pub struct PgStore {
    p: Pool<Postgres>,
}

impl PgStore {
    pub fn new(p: Pool<Postgres>) -> Self {
        Self { p }
    }
}

const TRANSACTION_COLUMNS: &str = r#"
    SELECT
        t.id,
        t.amount::text AS amount,
        t.type,
        t.fund_type,
        t.description,
        t.transaction_date,
        t.unit_id,
        u.unit_number,
        u.owner_name
    FROM financial_transactions t
    LEFT JOIN units u ON u.id = t.unit_id
"#;

// `amount` is read as text so a stored `NaN` numeric survives into the
// ledger instead of failing the decode.
#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    amount: Option<String>,
    #[sqlx(rename = "type")]
    kind: String,
    fund_type: String,
    description: String,
    transaction_date: DateTime<Utc>,
    unit_id: Option<Uuid>,
    unit_number: Option<String>,
    owner_name: Option<String>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = StoreError;

    fn try_from(r: TransactionRow) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: r.id,
            amount: r
                .amount
                .as_deref()
                .map_or(f64::NAN, ledger::parse_amount),
            kind: r.kind.parse().map_err(StoreError::Decode)?,
            fund_type: FundType::from(r.fund_type.as_str()),
            description: r.description,
            transaction_date: r.transaction_date,
            unit_id: r.unit_id,
            unit: join_unit(r.unit_number, r.owner_name),
        })
    }
}

fn join_unit(unit_number: Option<String>, owner_name: Option<String>) -> Option<UnitRef> {
    Some(UnitRef {
        unit_number: unit_number?,
        owner_name: owner_name?,
    })
}

#[derive(sqlx::FromRow)]
struct UnitRow {
    id: Uuid,
    unit_number: String,
    owner_name: String,
    status: String,
    email: Option<String>,
    phone: Option<String>,
}

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    title: String,
    description: String,
    status: String,
    priority: String,
    created_at: DateTime<Utc>,
    unit_number: Option<String>,
    owner_name: Option<String>,
}

#[async_trait]
impl Store for PgStore {
    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, StoreError> {
        let mut q = QueryBuilder::<Postgres>::new(TRANSACTION_COLUMNS);
        q.push(" WHERE TRUE");
        if let Some(fund) = &filter.fund_type {
            q.push(" AND t.fund_type = ").push_bind(fund.as_str().to_string());
        }
        if let Some(kind) = filter.kind {
            q.push(" AND t.type = ").push_bind(kind.as_str());
        }
        q.push(" ORDER BY t.created_at, t.id");

        let rows: Vec<TransactionRow> = q.build_query_as().fetch_all(&self.p).await?;
        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn insert_transaction(&self, new: &NewTransaction) -> Result<Transaction, StoreError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO financial_transactions
                (amount, type, description, fund_type, transaction_date)
            VALUES
                ($1::float8::numeric, $2, $3, $4, COALESCE($5, NOW()))
            RETURNING id
            "#,
        )
        .bind(new.amount)
        .bind(new.kind.as_str())
        .bind(&new.description)
        .bind(new.fund_type.as_str())
        .bind(new.transaction_date)
        .fetch_one(&self.p)
        .await
        .map_err(|err| {
            if let Some(db) = err.as_database_error() {
                if db.is_check_violation() {
                    return StoreError::Rejected(db.message().to_string());
                }
            }
            StoreError::Database(err)
        })?;

        let row: TransactionRow = sqlx::query_as(&format!("{} WHERE t.id = $1", TRANSACTION_COLUMNS))
            .bind(id)
            .fetch_one(&self.p)
            .await?;
        Transaction::try_from(row)
    }

    async fn list_units(&self) -> Result<Vec<Unit>, StoreError> {
        let rows: Vec<UnitRow> = sqlx::query_as(
            r#"
            SELECT id, unit_number, owner_name, status, email, phone
            FROM units
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.p)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Unit {
                id: r.id,
                unit_number: r.unit_number,
                owner_name: r.owner_name,
                status: r.status,
                email: r.email,
                phone: r.phone,
            })
            .collect())
    }

    async fn list_maintenance_requests(&self) -> Result<Vec<MaintenanceRequest>, StoreError> {
        let rows: Vec<RequestRow> = sqlx::query_as(
            r#"
            SELECT
                m.id,
                m.title,
                m.description,
                m.status,
                m.priority,
                m.created_at,
                u.unit_number,
                u.owner_name
            FROM maintenance_requests m
            LEFT JOIN units u ON u.id = m.unit_id
            ORDER BY m.created_at, m.id
            "#,
        )
        .fetch_all(&self.p)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| MaintenanceRequest {
                id: r.id,
                unit: join_unit(r.unit_number, r.owner_name),
                title: r.title,
                description: r.description,
                status: r.status,
                priority: r.priority,
                created_at: r.created_at,
            })
            .collect())
    }
}
