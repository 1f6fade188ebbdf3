use saree_commerce_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::products::{ActiveModel as ProductActive, Column, Entity as Products},
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    seed_products(&orm).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_products(orm: &DatabaseConnection) -> anyhow::Result<()> {
    // Prices in paise.
    let products = vec![
        (
            "Kanjivaram Silk Saree",
            "kanjivaram-silk-saree",
            "Handwoven pure silk with zari border",
            1250000,
            12,
        ),
        (
            "Banarasi Georgette Saree",
            "banarasi-georgette-saree",
            "Lightweight georgette with brocade work",
            850000,
            20,
        ),
        (
            "Chanderi Cotton Saree",
            "chanderi-cotton-saree",
            "Sheer cotton-silk blend for daily wear",
            320000,
            35,
        ),
        (
            "Mysore Crepe Saree",
            "mysore-crepe-saree",
            "Soft crepe silk in solid colours",
            540000,
            18,
        ),
    ];

    for (name, slug, description, price, stock) in products {
        let existing = Products::find()
            .filter(Column::Slug.eq(slug))
            .one(orm)
            .await?;
        if existing.is_some() {
            println!("Skipping existing product {slug}");
            continue;
        }

        ProductActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            description: Set(Some(description.to_string())),
            price: Set(price),
            stock: Set(stock),
            created_at: NotSet,
        }
        .insert(orm)
        .await?;
        println!("Seeded product {slug}");
    }

    Ok(())
}
