use gittalent::DeveloperProfile;
use gittalent::db;
use gittalent::profile;
use tabled::Tabled;

use crate::DeveloperAction;
use crate::commands::shared::join_or_dash;

#[derive(Debug, Tabled)]
struct Field {
    #[tabled(rename = "Field")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn profile_rows(profile: &DeveloperProfile) -> Vec<Field> {
    vec![
        Field {
            name: "User",
            value: profile.user_id.to_string(),
        },
        Field {
            name: "GitHub",
            value: profile.handle().unwrap_or("-").to_string(),
        },
        Field {
            name: "Installation",
            value: profile
                .github_installation_id
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
        },
        Field {
            name: "Languages",
            value: join_or_dash(&profile.top_languages),
        },
        Field {
            name: "Projects",
            value: join_or_dash(&profile.linked_projects),
        },
        Field {
            name: "Updated",
            value: profile.updated_at.format("%Y-%m-%d %H:%M:%S %Z").to_string(),
        },
    ]
}

fn print_profile(profile: &DeveloperProfile) {
    let mut table = tabled::Table::new(profile_rows(profile));
    table.with(tabled::settings::Style::rounded());
    println!("{table}");
}

pub(crate) async fn handle_developer(
    action: DeveloperAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    match action {
        DeveloperAction::Add {
            user_id,
            handle,
            installation_id,
        } => {
            let created = profile::insert(&db, user_id, handle.as_deref(), installation_id).await?;
            println!("Created developer profile for {}", created.user_id);
            print_profile(&created);
        }
        DeveloperAction::Link {
            user_id,
            handle,
            installation_id,
        } => {
            let linked = profile::link_github(&db, user_id, &handle, installation_id).await?;
            println!(
                "Linked {} to GitHub account '{}'",
                linked.user_id,
                linked.handle().unwrap_or(&handle)
            );
        }
        DeveloperAction::Show { user_id } => {
            let found = profile::find_by_user_id(&db, user_id)
                .await?
                .ok_or_else(|| profile::ProfileError::not_found_for_user(user_id))?;
            print_profile(&found);
        }
    }

    Ok(())
}
