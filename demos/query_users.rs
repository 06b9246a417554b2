use sqlite_comfort::prelude::*;

#[derive(Debug, Default)]
struct User {
    id: i64,
    name: String,
    age: i64,
    email: Option<String>,
}

sqlite_comfort::entity!(User {
    id: i64,
    name: String,
    age: i64,
    email: Option<String>,
});

fn main() -> Result<()> {
    let mut backend = SqliteBackend::open_in_memory()?;

    backend
        .comfort()
        .create_table(&[table_for::<User>("users", "id")])?;
    println!("Table created");

    backend.insert(
        "users",
        &[
            User { id: 1, name: "Alice".into(), age: 30, email: Some("alice@example.com".into()) },
            User { id: 2, name: "Bob".into(), age: 25, email: None },
            User { id: 3, name: "Carol".into(), age: 35, email: None },
        ],
    )?;

    let query = Query::new()
        .select(["id", "name", "age", "email"])
        .from("users")
        .condition(greater_eq("age", param()))
        .order_by_desc(["age"]);

    println!("Executing: {}", query);
    let users: Vec<User> = backend.comfort().query(&query, &[Value::Integer(28)])?;
    for user in &users {
        println!("{:?}", user);
    }

    let changed = backend.delete("users", Some("email IS NULL"), &[])?;
    println!("Deleted {} users without email", changed);

    backend.close()
}
