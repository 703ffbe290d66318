//! Implements the `Transport` trait with an in-memory lending server.
//!
//! The server holds seeded companies, customers and transactions, authenticates with a single
//! staff account, derives slips and a cashbook from its transactions, and records every request it
//! receives. Tests can queue canned responses with `force_next`, e.g. a 401.

use crate::api::{ApiError, ApiRequest, Body, Method, Part, RawResponse, Transport};
use crate::model::{
    Amount, ApStatus, Company, CreateCompanyPayload, Customer, Party, PartyRole, Transaction,
    TransactionPayload, TransactionType,
};
use crate::session::{encode_token, Claims};
use chrono::{Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, VecDeque};
use tokio::sync::Mutex;
use tracing::trace;

/// The staff account the test server accepts.
pub const TEST_EMAIL: &str = "admin@example.com";
pub const TEST_PASSWORD: &str = "password";
const TEST_USER_ID: u64 = 1;

#[derive(Debug, Default)]
struct State {
    companies: Vec<Company>,
    customers: Vec<Customer>,
    transactions: Vec<Transaction>,
    next_company: u64,
    next_customer: u64,
    next_transaction: u64,
    requests: Vec<ApiRequest>,
    forced: VecDeque<RawResponse>,
}

#[derive(Debug)]
pub struct TestServer {
    state: Mutex<State>,
}

impl Default for TestServer {
    fn default() -> Self {
        Self::new()
    }
}

impl TestServer {
    /// A server seeded with two companies, three customers and two transactions.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(seed()),
        }
    }

    /// A server with no data at all.
    pub fn empty() -> Self {
        Self {
            state: Mutex::new(State {
                next_company: 1,
                next_customer: 1,
                next_transaction: 1,
                ..State::default()
            }),
        }
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().await.requests.clone()
    }

    /// The number of requests received for `path` (without query), with any method.
    pub async fn count(&self, path: &str) -> usize {
        let path = path.trim_matches('/');
        self.state
            .lock()
            .await
            .requests
            .iter()
            .filter(|r| r.path.trim_matches('/') == path)
            .count()
    }

    /// The next request is answered with `response`, whatever it is.
    pub async fn force_next(&self, response: RawResponse) {
        self.state.lock().await.forced.push_back(response);
    }

    /// A valid token for the test account.
    pub fn token() -> String {
        let now = Utc::now().timestamp();
        encode_token(&Claims {
            sub: TEST_USER_ID,
            email: TEST_EMAIL.to_string(),
            iat: now,
            exp: now + 24 * 60 * 60,
        })
    }
}

#[async_trait::async_trait]
impl Transport for TestServer {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        let mut state = self.state.lock().await;
        state.requests.push(request.clone());
        trace!("Test server received {}", request.endpoint());

        if let Some(forced) = state.forced.pop_front() {
            return Ok(forced);
        }

        let path = request.path.trim_matches('/').to_string();
        let segments: Vec<&str> = path.split('/').collect();

        if segments.as_slice() == ["auth", "login"] {
            return Ok(login(request));
        }
        if !authorized(request) {
            return Ok(failure(401, "Unauthorized"));
        }

        let response = match (request.method, segments.as_slice()) {
            (Method::Get, ["companies"]) => ok(200, "Companies fetched", &state.companies),
            (Method::Post, ["companies"]) => state.create_company(request),
            (Method::Get, ["customers"]) => ok(200, "Customers fetched", &state.customers),
            (Method::Post, ["customers"]) => state.create_customer(request),
            (Method::Patch, ["customers", id, "status"]) => match id.parse() {
                Ok(id) => state.toggle_customer(id),
                Err(_) => failure(400, "Invalid customer id"),
            },
            (Method::Delete, ["customers", id]) => match id.parse() {
                Ok(id) => state.delete_customer(id),
                Err(_) => failure(400, "Invalid customer id"),
            },
            (Method::Get, ["transactions"]) => {
                ok(200, "Transactions fetched", &state.transactions)
            }
            (Method::Post, ["transactions"]) => state.save_transaction(request, None),
            (Method::Get, ["transactions", "cashbook"]) => state.cashbook(request),
            (Method::Get, ["transactions", id, "slip"]) => match id.parse() {
                Ok(id) => state.slip(id, request),
                Err(_) => failure(400, "Invalid transaction id"),
            },
            (method, ["transactions", id]) => match (method, id.parse::<u64>()) {
                (_, Err(_)) => failure(400, "Invalid transaction id"),
                (Method::Get, Ok(id)) => match state.transactions.iter().find(|t| t.id == id) {
                    Some(t) => ok(200, "Transaction fetched", t),
                    None => failure(404, "Transaction not found"),
                },
                (Method::Patch, Ok(id)) => state.save_transaction(request, Some(id)),
                (Method::Delete, Ok(id)) => state.delete_transaction(id),
                (Method::Post, Ok(_)) => failure(404, "Cannot POST"),
            },
            _ => failure(404, &format!("Cannot {}", request.endpoint())),
        };
        Ok(response)
    }
}

fn ok<T: Serialize + ?Sized>(status: u16, message: &str, data: &T) -> RawResponse {
    let body = json!({"success": true, "message": message, "data": data});
    RawResponse::new(status, body.to_string())
}

fn failure(status: u16, message: &str) -> RawResponse {
    let body = json!({"success": false, "statusCode": status, "message": message});
    RawResponse::new(status, body.to_string())
}

fn json_body(request: &ApiRequest) -> Option<&Value> {
    match &request.body {
        Body::Json(v) => Some(v),
        _ => None,
    }
}

fn login(request: &ApiRequest) -> RawResponse {
    let body = json_body(request);
    let field = |name: &str| {
        body.and_then(|b| b.get(name))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    if field("email") == TEST_EMAIL && field("password") == TEST_PASSWORD {
        ok(
            200,
            "Login successful",
            &json!({
                "accessToken": TestServer::token(),
                "user": {"id": TEST_USER_ID, "email": TEST_EMAIL}
            }),
        )
    } else {
        failure(401, "Invalid email or password")
    }
}

fn authorized(request: &ApiRequest) -> bool {
    let Some(token) = request.bearer.as_deref() else {
        return false;
    };
    match Claims::decode(token) {
        Ok(claims) => claims.exp > Utc::now().timestamp(),
        Err(_) => false,
    }
}

fn thousand() -> Decimal {
    Decimal::from(1000)
}

fn percent_of(base: Decimal, rate: Decimal) -> Decimal {
    (base * rate / Decimal::from(100)).round_dp(2)
}

impl State {
    fn create_company(&mut self, request: &ApiRequest) -> RawResponse {
        let payload: CreateCompanyPayload =
            match json_body(request).map(|v| serde_json::from_value(v.clone())) {
                Some(Ok(p)) => p,
                _ => return failure(400, "companyName should not be empty"),
            };
        let name = payload.company_name.trim().to_string();
        if name.is_empty() {
            return failure(400, "companyName should not be empty");
        }
        if self
            .companies
            .iter()
            .any(|c| c.company_name.eq_ignore_ascii_case(&name))
        {
            return failure(409, "Company already exists");
        }
        let company = Company {
            id: self.next_company,
            company_name: name,
            company_desc: payload.company_desc,
            created_at: Some(Utc::now().to_rfc3339()),
        };
        self.next_company += 1;
        self.companies.push(company.clone());
        ok(201, "Company created successfully", &company)
    }

    fn create_customer(&mut self, request: &ApiRequest) -> RawResponse {
        let Body::Multipart(parts) = &request.body else {
            return failure(400, "Expected multipart/form-data");
        };
        let mut fields: BTreeMap<String, String> = BTreeMap::new();
        let mut documents: BTreeMap<String, Value> = BTreeMap::new();
        for part in parts {
            match part {
                Part::Text { name, value } => {
                    fields.insert(name.clone(), value.clone());
                }
                Part::File {
                    name, file_name, ..
                } => {
                    documents.insert(
                        format!("{name}Doc"),
                        Value::String(format!("uploads/{name}/{file_name}")),
                    );
                }
            }
        }

        let flag = |name: &str| fields.get(name).map(|v| v == "true").unwrap_or(false);
        let (is_borrower, is_lender) = (flag("isBorrower"), flag("isLender"));
        let missing = ["fullName", "emailAddress", "mobileNumber", "companyId"]
            .into_iter()
            .find(|k| fields.get(*k).map(|v| v.trim().is_empty()).unwrap_or(true));
        if let Some(first) = missing {
            return failure(400, &format!("{first} should not be empty"));
        }
        if !is_borrower && !is_lender {
            return failure(400, "Customer must be a borrower or a lender");
        }
        let company_id: u64 = match fields.get("companyId").map(|v| v.parse()) {
            Some(Ok(id)) => id,
            _ => return failure(400, "companyId must be a number"),
        };
        let Some(company) = self.companies.iter().find(|c| c.id == company_id).cloned() else {
            return failure(404, "Company not found");
        };
        let email = fields.get("emailAddress").cloned().unwrap_or_default();
        if self
            .customers
            .iter()
            .any(|c| c.email_address.eq_ignore_ascii_case(&email))
        {
            return failure(409, "Email already exists");
        }

        let mut details: BTreeMap<String, Value> = BTreeMap::new();
        for (k, v) in &fields {
            if ![
                "isBorrower",
                "isLender",
                "fullName",
                "emailAddress",
                "mobileNumber",
                "companyId",
                "lenderGroup",
                "borrowerGroup",
            ]
            .contains(&k.as_str())
            {
                details.insert(k.clone(), Value::String(v.clone()));
            }
        }
        details.extend(documents);

        let customer = Customer {
            id: self.next_customer,
            is_borrower,
            is_lender,
            full_name: fields.get("fullName").cloned().unwrap_or_default(),
            email_address: email,
            mobile_number: fields.get("mobileNumber").cloned().unwrap_or_default(),
            lender_group: fields.get("lenderGroup").cloned(),
            borrower_group: fields.get("borrowerGroup").cloned(),
            company_id: Some(company_id),
            company: Some(company),
            is_active: true,
            created_at: Some(Utc::now().to_rfc3339()),
            details,
        };
        self.next_customer += 1;
        self.customers.push(customer.clone());
        ok(201, "Customer created successfully", &customer)
    }

    fn toggle_customer(&mut self, id: u64) -> RawResponse {
        match self.customers.iter_mut().find(|c| c.id == id) {
            Some(c) => {
                c.is_active = !c.is_active;
                let message = if c.is_active {
                    "Customer activated"
                } else {
                    "Customer deactivated"
                };
                ok(200, message, c)
            }
            None => failure(404, "Customer not found"),
        }
    }

    fn delete_customer(&mut self, id: u64) -> RawResponse {
        let used = self
            .transactions
            .iter()
            .any(|t| t.lender_ids().contains(&id) || t.borrower_ids().contains(&id));
        if used {
            return failure(409, "Customer is part of a transaction and cannot be deleted");
        }
        let before = self.customers.len();
        self.customers.retain(|c| c.id != id);
        if self.customers.len() == before {
            failure(404, "Customer not found")
        } else {
            ok(200, "Customer deleted successfully", &Value::Null)
        }
    }

    fn parties(&self, ids: &[u64], lenders: bool) -> Result<Vec<Party>, String> {
        ids.iter()
            .map(|id| {
                let customer = self
                    .customers
                    .iter()
                    .find(|c| c.id == *id)
                    .ok_or_else(|| format!("Customer {id} not found"))?;
                let allowed = if lenders {
                    customer.is_lender
                } else {
                    customer.is_borrower
                };
                if !allowed {
                    let role = if lenders { "lender" } else { "borrower" };
                    return Err(format!("{} is not a {role}", customer.full_name));
                }
                Ok(Party {
                    id: customer.id,
                    full_name: customer.full_name.clone(),
                })
            })
            .collect()
    }

    fn save_transaction(&mut self, request: &ApiRequest, id: Option<u64>) -> RawResponse {
        let payload: TransactionPayload =
            match json_body(request).map(|v| serde_json::from_value(v.clone())) {
                Some(Ok(p)) => p,
                Some(Err(e)) => return failure(400, &e.to_string()),
                None => return failure(400, "Expected a JSON body"),
            };
        if payload.lender_ids.is_empty() || payload.borrower_ids.is_empty() {
            return failure(400, "At least one lender and one borrower are required");
        }
        let Some(company) = self
            .companies
            .iter()
            .find(|c| c.id == payload.company_id)
            .cloned()
        else {
            return failure(404, "Company not found");
        };
        let lenders = match self.parties(&payload.lender_ids, true) {
            Ok(p) => p,
            Err(m) => return failure(400, &m),
        };
        let borrowers = match self.parties(&payload.borrower_ids, false) {
            Ok(p) => p,
            Err(m) => return failure(400, &m),
        };

        let id = match id {
            Some(id) => {
                if !self.transactions.iter().any(|t| t.id == id) {
                    return failure(404, "Transaction not found");
                }
                id
            }
            None => {
                let id = self.next_transaction;
                self.next_transaction += 1;
                id
            }
        };
        let transaction = Transaction {
            id,
            company_id: Some(company.id),
            company: Some(company),
            transaction_type: payload.transaction_type,
            transaction_number_type: payload.transaction_number_type,
            transaction_date: format!("{}T00:00:00.000Z", payload.transaction_date),
            month: payload.month,
            amount_in_thousands: payload.amount_in_thousands,
            a_p_status: payload.a_p_status,
            lenders,
            borrowers,
            interest_recieved: payload.interest_recieved,
            interest_paid: payload.interest_paid,
            comission_percentage: payload.comission_percentage,
            remarks: payload.remarks,
        };

        match self.transactions.iter_mut().find(|t| t.id == id) {
            Some(existing) => {
                *existing = transaction.clone();
                ok(200, "Transaction updated successfully", &transaction)
            }
            None => {
                self.transactions.push(transaction.clone());
                ok(201, "Transaction created successfully", &transaction)
            }
        }
    }

    fn delete_transaction(&mut self, id: u64) -> RawResponse {
        let before = self.transactions.len();
        self.transactions.retain(|t| t.id != id);
        if self.transactions.len() == before {
            failure(404, "Transaction not found")
        } else {
            ok(200, "Transaction deleted successfully", &Value::Null)
        }
    }

    fn cashbook(&self, request: &ApiRequest) -> RawResponse {
        let param = |name: &str| {
            request
                .query
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };
        let company_id = match param("companyId").map(str::parse::<u64>) {
            Some(Ok(id)) => Some(id),
            Some(Err(_)) => return failure(400, "companyId must be a number"),
            None => None,
        };
        let date = |name: &str| match param(name) {
            Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| failure(400, &format!("{name} must be a date"))),
            None => Ok(None),
        };
        let (start, end) = match (date("startDate"), date("endDate")) {
            (Ok(s), Ok(e)) => (s, e),
            (Err(r), _) | (_, Err(r)) => return r,
        };

        let mut transactions: Vec<&Transaction> = self
            .transactions
            .iter()
            .filter(|t| company_id.is_none() || t.company_id() == company_id)
            .filter(|t| match (t.date(), start) {
                (Some(d), Some(s)) => d >= s,
                _ => true,
            })
            .filter(|t| match (t.date(), end) {
                (Some(d), Some(e)) => d <= e,
                _ => true,
            })
            .collect();
        transactions.sort_by_key(|t| (t.date(), t.id));

        let mut entries = Vec::new();
        let mut balance = Decimal::ZERO;
        let mut push = |date: &str, description: String, reference: String, r: Decimal, d: Decimal| {
            balance += r - d;
            let cell = |v: Decimal| {
                if v.is_zero() {
                    json!("-")
                } else {
                    json!(Amount::new(v))
                }
            };
            let id = entries.len() + 1;
            entries.push(json!({
                "id": id,
                "date": date,
                "description": description,
                "reference": reference,
                "receiving": cell(r),
                "deduction": cell(d),
                "balance": Amount::new(balance),
            }));
        };
        for t in transactions {
            let date = t.transaction_date.split('T').next().unwrap_or_default();
            let principal = t.amount_in_thousands.value() * thousand();
            let borrowers: Vec<&str> = t.borrowers.iter().map(|b| b.full_name.as_str()).collect();
            let reference = format!("TX-{}", t.id);
            push(
                date,
                format!("Loan to {}", borrowers.join(", ")),
                reference.clone(),
                Decimal::ZERO,
                principal,
            );
            if let Some(rate) = t.interest_recieved.filter(|r| !r.is_zero()) {
                push(
                    date,
                    "Interest received".to_string(),
                    reference.clone(),
                    percent_of(principal, rate.value()),
                    Decimal::ZERO,
                );
            }
            if let Some(rate) = t.interest_paid.filter(|r| !r.is_zero()) {
                push(
                    date,
                    "Interest paid".to_string(),
                    reference.clone(),
                    Decimal::ZERO,
                    percent_of(principal, rate.value()),
                );
            }
        }
        ok(200, "Cashbook fetched", &json!({ "data": entries }))
    }

    fn slip(&self, id: u64, request: &ApiRequest) -> RawResponse {
        let role = request
            .query
            .iter()
            .find(|(k, _)| k == "type")
            .map(|(_, v)| v.parse::<PartyRole>())
            .unwrap_or(Ok(PartyRole::Lender));
        let Ok(role) = role else {
            return failure(400, "type must be lender or borrower");
        };
        let Some(t) = self.transactions.iter().find(|t| t.id == id) else {
            return failure(404, "Transaction not found");
        };

        let parties = match role {
            PartyRole::Lender => &t.lenders,
            PartyRole::Borrower => &t.borrowers,
        };
        let cash = t.amount_in_thousands.value() * thousand();
        let due = t.date();
        let up_to = due.and_then(|d| d.checked_add_months(Months::new(t.transaction_number_type)));
        let ap = match t.a_p_status {
            ApStatus::Advanced => "A",
            ApStatus::Past => "P",
        };
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.format("%d/%m/%Y").to_string());
        let rows: Vec<Value> = parties
            .iter()
            .map(|p| {
                json!({
                    "cash": Amount::new(cash),
                    "partyName": p.full_name,
                    "partyStatus": role.to_string(),
                    "due": fmt(due),
                    "upTo": fmt(up_to),
                    "m": t.transaction_number_type,
                    "ap": ap,
                    "amt": t.amount_in_thousands,
                })
            })
            .collect();
        let count = Decimal::from(rows.len() as u64);
        let name = t.company.as_ref().map(|c| c.company_name.to_uppercase());
        ok(
            200,
            "Slip fetched",
            &json!({
                "header": {"name": name},
                "rows": rows,
                "subtotalCash": Amount::new(cash * count),
                "subtotalAmt": Amount::new(t.amount_in_thousands.value() * count),
                "generatedAt": Utc::now().format("%d/%m/%Y %H:%M").to_string(),
            }),
        )
    }
}

fn seed() -> State {
    let acme = Company {
        id: 1,
        company_name: "Acme Finance".to_string(),
        company_desc: Some("Main lending book".to_string()),
        created_at: Some("2024-01-01T09:00:00.000Z".to_string()),
    };
    let hills = Company {
        id: 2,
        company_name: "Blue Hills Traders".to_string(),
        company_desc: None,
        created_at: Some("2024-01-05T09:00:00.000Z".to_string()),
    };
    let customer = |id: u64, name: &str, lender: bool, borrower: bool, company: &Company| Customer {
        id,
        is_borrower: borrower,
        is_lender: lender,
        full_name: name.to_string(),
        email_address: format!("{}@example.com", name.split(' ').next().unwrap_or(name).to_lowercase()),
        mobile_number: format!("90000000{id:02}"),
        lender_group: lender.then(|| "North".to_string()),
        borrower_group: borrower.then(|| "Retail".to_string()),
        company_id: Some(company.id),
        company: Some(company.clone()),
        is_active: true,
        created_at: Some("2024-01-06T09:00:00.000Z".to_string()),
        details: BTreeMap::new(),
    };
    let customers = vec![
        customer(1, "Asha Verma", true, false, &acme),
        customer(2, "Ravi Kumar", false, true, &acme),
        customer(3, "Meena Iyer", true, true, &hills),
    ];
    let party = |c: &Customer| Party {
        id: c.id,
        full_name: c.full_name.clone(),
    };
    let transactions = vec![
        Transaction {
            id: 1,
            company: Some(acme.clone()),
            company_id: Some(acme.id),
            transaction_type: TransactionType::S,
            transaction_number_type: 1,
            transaction_date: "2024-01-10T00:00:00.000Z".to_string(),
            month: None,
            amount_in_thousands: Amount::from(100i64),
            a_p_status: ApStatus::Advanced,
            lenders: vec![party(&customers[0])],
            borrowers: vec![party(&customers[1])],
            interest_recieved: Some(Amount::from(2i64)),
            interest_paid: Some(Amount::from(1i64)),
            comission_percentage: vec![Amount::from(1i64)],
            remarks: Some("First loan".to_string()),
        },
        Transaction {
            id: 2,
            company: Some(hills.clone()),
            company_id: Some(hills.id),
            transaction_type: TransactionType::M,
            transaction_number_type: 3,
            transaction_date: "2024-02-15T00:00:00.000Z".to_string(),
            month: Some("February".to_string()),
            amount_in_thousands: Amount::from(250i64),
            a_p_status: ApStatus::Past,
            lenders: vec![party(&customers[2])],
            borrowers: vec![party(&customers[1]), party(&customers[2])],
            interest_recieved: Some(Amount::from(3i64)),
            interest_paid: None,
            comission_percentage: vec![],
            remarks: None,
        },
    ];
    State {
        companies: vec![acme, hills],
        customers,
        transactions,
        next_company: 3,
        next_customer: 4,
        next_transaction: 3,
        requests: Vec::new(),
        forced: VecDeque::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CashbookData, Slip};

    fn signed(request: ApiRequest) -> ApiRequest {
        ApiRequest {
            bearer: Some(TestServer::token()),
            ..request
        }
    }

    fn data(response: &RawResponse) -> Value {
        let body: Value = serde_json::from_str(&response.body).unwrap();
        body["data"].clone()
    }

    #[tokio::test]
    async fn test_requires_bearer() {
        let server = TestServer::new();
        let r = server.send(&ApiRequest::get("companies")).await.unwrap();
        assert_eq!(r.status, 401);
        let r = server.send(&signed(ApiRequest::get("companies"))).await.unwrap();
        assert_eq!(r.status, 200);
        assert_eq!(data(&r).as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_login() {
        let server = TestServer::new();
        let good = ApiRequest::post("auth/login")
            .json(&json!({"email": TEST_EMAIL, "password": TEST_PASSWORD}))
            .unwrap();
        let r = server.send(&good).await.unwrap();
        let token = data(&r)["accessToken"].as_str().unwrap().to_string();
        assert_eq!(Claims::decode(&token).unwrap().email, TEST_EMAIL);

        let bad = ApiRequest::post("auth/login")
            .json(&json!({"email": TEST_EMAIL, "password": "nope"}))
            .unwrap();
        let r = server.send(&bad).await.unwrap();
        assert_eq!(r.status, 401);
        assert!(r.body.contains("Invalid email or password"));
    }

    #[tokio::test]
    async fn test_cashbook_running_balance() {
        let server = TestServer::new();
        let request = signed(ApiRequest::get("transactions/cashbook"))
            .query(vec![("companyId".into(), "1".into())]);
        let r = server.send(&request).await.unwrap();
        let entries = serde_json::from_value::<CashbookData>(data(&r))
            .unwrap()
            .into_entries();
        // loan, interest received, interest paid
        assert_eq!(entries.len(), 3);
        let mut balance = Decimal::ZERO;
        for e in &entries {
            balance += e.receiving.value() - e.deduction.value();
            assert_eq!(e.balance.value(), balance);
        }
        assert_eq!(balance, Decimal::from(-99000));
    }

    #[tokio::test]
    async fn test_slip_rows_follow_role() {
        let server = TestServer::new();
        let request =
            signed(ApiRequest::get("transactions/2/slip")).query(vec![("type".into(), "borrower".into())]);
        let r = server.send(&request).await.unwrap();
        let slip: Slip = serde_json::from_value(data(&r)).unwrap();
        assert_eq!(slip.rows.len(), 2);
        assert_eq!(slip.name(), "BLUE HILLS TRADERS");
        assert_eq!(slip.rows[0].up_to.as_ref().unwrap().to_string(), "15/05/2024");
    }

    #[tokio::test]
    async fn test_forced_response_is_used_once() {
        let server = TestServer::new();
        server.force_next(RawResponse::new(503, "down")).await;
        let request = signed(ApiRequest::get("customers"));
        assert_eq!(server.send(&request).await.unwrap().status, 503);
        assert_eq!(server.send(&request).await.unwrap().status, 200);
        assert_eq!(server.count("customers").await, 2);
    }
}
