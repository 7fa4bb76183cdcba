use sea_orm_migration::{prelude::*, schema::*, sea_orm::DatabaseBackend};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // City lookups are exact and case-sensitive; MySQL's default collation is not.
        let mut city = string_len(Businesses::City, 100);
        if manager.get_database_backend() == DatabaseBackend::MySql {
            city.extra("COLLATE utf8mb4_bin");
        }

        manager
            .create_table(
                Table::create()
                    .table(Businesses::Table)
                    .if_not_exists()
                    .col(pk_auto(Businesses::Id))
                    .col(string_len(Businesses::Name, 255).not_null())
                    .col(double(Businesses::Latitude).not_null())
                    .col(double(Businesses::Longitude).not_null())
                    .col(string_len(Businesses::Type, 20).not_null())
                    .col(city.not_null())
                    .col(string_len(Businesses::Address, 255).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_businesses_city_type")
                    .table(Businesses::Table)
                    .col(Businesses::City)
                    .col(Businesses::Type)
                    .to_owned(),
            )
            .await?;

        // Seed businesses
        let insert = Query::insert()
            .into_table(Businesses::Table)
            .columns([
                Businesses::Name,
                Businesses::Latitude,
                Businesses::Longitude,
                Businesses::Type,
                Businesses::City,
                Businesses::Address,
            ])
            .values_panic(["Chicken Inn".into(), (-20.1472).into(), (28.5833).into(), "fast_food".into(), "Bulawayo".into(), "Fife Street & 10th Avenue".into()])
            .values_panic(["Pizza Inn".into(), (-20.1491).into(), (28.5852).into(), "fast_food".into(), "Bulawayo".into(), "Jason Moyo Street".into()])
            .values_panic(["Steers".into(), (-20.1503).into(), (28.5794).into(), "fast_food".into(), "Bulawayo".into(), "Main Street".into()])
            .values_panic(["Bulawayo Club Restaurant".into(), (-20.1528).into(), (28.5861).into(), "restaurant".into(), "Bulawayo".into(), "Corner 8th Avenue & Fort Street".into()])
            .values_panic(["Hillside Dams Restaurant".into(), (-20.1850).into(), (28.6100).into(), "restaurant".into(), "Bulawayo".into(), "Hillside Road".into()])
            .values_panic(["Natural History Museum".into(), (-20.1622).into(), (28.5931).into(), "tourism".into(), "Bulawayo".into(), "Centenary Park, Leopold Takawira Avenue".into()])
            .values_panic(["Bulawayo Railway Museum".into(), (-20.1597).into(), (28.5703).into(), "tourism".into(), "Bulawayo".into(), "Prospect Avenue, Raylton".into()])
            .values_panic(["Chicken Inn".into(), (-17.8310).into(), (31.0490).into(), "fast_food".into(), "Harare".into(), "First Street".into()])
            .values_panic(["Amanzi Restaurant".into(), (-17.7869).into(), (31.0931).into(), "restaurant".into(), "Harare".into(), "158 Enterprise Road".into()])
            .values_panic(["National Gallery of Zimbabwe".into(), (-17.8286).into(), (31.0536).into(), "tourism".into(), "Harare".into(), "20 Julius Nyerere Way".into()])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Businesses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Businesses {
    Table,
    Id,
    Name,
    Latitude,
    Longitude,
    Type,
    City,
    Address,
}
