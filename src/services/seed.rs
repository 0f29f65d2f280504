use rust_decimal::Decimal;
use tracing::info;

use crate::error::Result;
use crate::models::expert::NewExpert;
use crate::services::expert_service::ExpertService;

struct DemoExpert {
    name: &'static str,
    category: &'static str,
    experience: i32,
    rating: f64,
    bio: &'static str,
    seed: &'static str,
    hourly_rate: i64,
}

const DEMO_EXPERTS: [DemoExpert; 12] = [
    DemoExpert { name: "Dr. Aisha Patel", category: "Technology", experience: 12, rating: 4.9, bio: "Full-stack architect with 12 years in fintech and AI. Mentor to 200+ engineers.", seed: "Aisha", hourly_rate: 150 },
    DemoExpert { name: "Marcus Chen", category: "Finance", experience: 8, rating: 4.7, bio: "Investment strategist specializing in startup funding and venture capital.", seed: "Marcus", hourly_rate: 120 },
    DemoExpert { name: "Sara Williams", category: "Design", experience: 6, rating: 4.8, bio: "Award-winning UI/UX designer. Former design lead at Google and Airbnb.", seed: "Sara", hourly_rate: 100 },
    DemoExpert { name: "Raj Kapoor", category: "Technology", experience: 15, rating: 4.6, bio: "Cloud infrastructure expert. AWS Solutions Architect specializing in scalability.", seed: "Raj", hourly_rate: 160 },
    DemoExpert { name: "Dr. Emily Rodriguez", category: "Healthcare", experience: 18, rating: 5.0, bio: "Board-certified physician with expertise in telemedicine and health tech.", seed: "Emily", hourly_rate: 200 },
    DemoExpert { name: "James Okafor", category: "Marketing", experience: 9, rating: 4.5, bio: "Growth hacker who scaled 3 startups to unicorn status. SEO & content strategist.", seed: "James", hourly_rate: 90 },
    DemoExpert { name: "Lisa Thompson", category: "Finance", experience: 11, rating: 4.8, bio: "CFO coach and financial planning expert. Helped 50+ companies achieve profitability.", seed: "Lisa", hourly_rate: 135 },
    DemoExpert { name: "Dev Kumar", category: "Technology", experience: 7, rating: 4.7, bio: "React & React Native specialist. Built apps serving 10M+ daily users.", seed: "Dev", hourly_rate: 110 },
    DemoExpert { name: "Priya Sharma", category: "Design", experience: 5, rating: 4.6, bio: "Product designer with expertise in design systems and accessibility.", seed: "Priya", hourly_rate: 95 },
    DemoExpert { name: "Nick O'Brien", category: "Marketing", experience: 14, rating: 4.9, bio: "Digital marketing veteran. Former CMO with expertise in brand building.", seed: "Nick", hourly_rate: 145 },
    DemoExpert { name: "Dr. Fatima Al-Said", category: "Healthcare", experience: 20, rating: 4.9, bio: "Nutritionist and wellness coach. Author of 3 bestselling health books.", seed: "Fatima", hourly_rate: 180 },
    DemoExpert { name: "Alex Turner", category: "Technology", experience: 10, rating: 4.7, bio: "Cybersecurity expert. CISO consultant specializing in startup security posture.", seed: "Alex", hourly_rate: 170 },
];

fn avatar_url(seed: &str) -> String {
    format!("https://api.dicebear.com/7.x/avataaars/svg?seed={}", seed)
}

pub fn demo_experts() -> Vec<NewExpert> {
    DEMO_EXPERTS
        .iter()
        .map(|demo| NewExpert {
            name: demo.name.to_string(),
            category: demo.category.to_string(),
            experience: demo.experience,
            rating: demo.rating,
            bio: Some(demo.bio.to_string()),
            avatar: Some(avatar_url(demo.seed)),
            hourly_rate: Some(Decimal::from(demo.hourly_rate)),
        })
        .collect()
}

/// Provisions the demo directory when the store holds no experts yet.
/// Returns how many experts were created.
pub async fn seed_if_empty(experts: &ExpertService) -> Result<usize> {
    if experts.count().await? > 0 {
        info!("Directory already seeded");
        return Ok(0);
    }

    let demo = demo_experts();
    let created = demo.len();
    for expert in demo {
        experts.provision(expert).await?;
    }
    info!(experts = created, "Seeded demo directory");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::dto::expert_dto::ExpertListQuery;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn seeding_runs_once() {
        let experts = ExpertService::new(Arc::new(MemoryStore::new()), Duration::from_secs(1));
        tokio_test::assert_ok!(seed_if_empty(&experts).await);
        assert_eq!(seed_if_empty(&experts).await.unwrap(), 0);

        let list = experts
            .list(ExpertListQuery {
                limit: Some(100),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(list.total, 12);
        assert_eq!(list.items[0].name, "Dr. Emily Rodriguez");
    }
}
