use sqlite_comfort::condition::{greater, greater_eq, is_not_null};
use sqlite_comfort::schema::{
    Check, Column, ForeignKey, ForeignKeyAction, Index, SqlType, Table,
};

fn main() {
    let player = Table::new(
        "Player",
        vec![
            Column::new("id", SqlType::Integer).primary_key().autoincrement(),
            Column::new("name", SqlType::Text).not_null().unique(),
            Column::new("email", SqlType::Text).check(is_not_null("email")),
            Column::new("score", SqlType::Integer)
                .not_null()
                .default_value("0"),
        ],
    );

    let inventory = Table::new(
        "Inventory",
        vec![
            Column::new("id", SqlType::Integer).primary_key(),
            Column::new("player_id", SqlType::Integer).not_null(),
            Column::new("item_name", SqlType::Text).not_null(),
            Column::new("quantity", SqlType::Integer),
        ],
    )
    .check(Check::new().check(greater_eq("quantity", 0)).check(greater("length(item_name)", 0)))
    .foreign_key(
        ForeignKey::new("player_id")
            .references("Player", "id")
            .on_delete(ForeignKeyAction::Cascade),
    );

    let index = Index::new("idx_inventory_player", "Inventory", ["player_id", "item_name"]).unique();

    println!("Generated DDL:");
    for (i, statement) in [
        player.create_statement(),
        inventory.create_statement(),
        index.create_statement(),
    ]
    .iter()
    .enumerate()
    {
        println!("Statement {}:", i);
        println!("{}", statement);
        println!("---");
    }

    println!("{}", inventory.drop_statement());
}
