use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Portfolios {
    Table,
    OwnerId,
    Status,
    Visibility,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    PortfolioId,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Student dashboards list by owner
        manager
            .create_index(
                Index::create()
                    .name("idx_portfolios_owner_id")
                    .table(Portfolios::Table)
                    .col(Portfolios::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Review queues and the public gallery filter on status + visibility
        manager
            .create_index(
                Index::create()
                    .name("idx_portfolios_status_visibility")
                    .table(Portfolios::Table)
                    .col(Portfolios::Status)
                    .col(Portfolios::Visibility)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_portfolio_created")
                    .table(Comments::Table)
                    .col(Comments::PortfolioId)
                    .col(Comments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_portfolios_owner_id").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_portfolios_status_visibility")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_comments_portfolio_created")
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
