pub fn render_index(user_id: Option<&str>) -> String {
    let user = user_id.unwrap_or("");
    INDEX_HTML
        .replace("{{USER}}", user)
        .replace("{{HIDDEN}}", if user.is_empty() { "hidden" } else { "" })
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Streaks</title>
  <style>
    :root {
      --paper: #fdf0e5;
      --card: #feeee3;
      --ink: #27231f;
      --coral: #ff7f50;
      --daily: #fd5757;
      --weekly: #ff963f;
      --monthly: #ffde68;
      --done: #3cd43c;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--paper);
      color: var(--ink);
      font-family: Verdana, "Trebuchet MS", sans-serif;
      display: grid;
      justify-items: center;
      padding: 24px 16px 48px;
    }

    main {
      width: min(640px, 100%);
      display: grid;
      gap: 20px;
    }

    header {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
      flex-wrap: wrap;
    }

    h1 {
      margin: 0;
      font-size: 1.6rem;
    }

    form.inline {
      display: flex;
      gap: 8px;
    }

    input, textarea, select, button {
      font: inherit;
      border-radius: 12px;
      border: 1px solid var(--coral);
      padding: 8px 12px;
      background: white;
    }

    button {
      background: var(--coral);
      color: white;
      cursor: pointer;
    }

    button.ghost {
      background: transparent;
      color: var(--ink);
    }

    nav {
      display: flex;
      gap: 8px;
    }

    nav button[aria-selected="false"] {
      background: white;
      color: var(--ink);
    }

    .card {
      background: var(--card);
      border-radius: 16px;
      padding: 18px 20px;
      display: grid;
      gap: 8px;
      transition: opacity 200ms ease;
    }

    .card.completed {
      opacity: 0.4;
    }

    .card h2 {
      margin: 0;
      font-size: 1.2rem;
      overflow: hidden;
      text-overflow: ellipsis;
      white-space: nowrap;
    }

    .card p {
      margin: 0;
      color: #5f5c57;
    }

    .footer {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 8px;
    }

    .pill {
      border-radius: 16px;
      padding: 4px 14px;
      background: var(--coral);
    }

    .pill.Daily { background: var(--daily); }
    .pill.Weekly { background: var(--weekly); }
    .pill.Monthly { background: var(--monthly); }

    .actions {
      display: flex;
      gap: 8px;
    }

    .actions button.complete {
      background: var(--done);
    }

    #add-panel {
      display: grid;
      gap: 10px;
    }

    .status {
      min-height: 1.2em;
      font-size: 0.9rem;
    }

    .status[data-type="error"] { color: #c62828; }
    .status[data-type="ok"] { color: #2e7d32; }

    [hidden] {
      display: none !important;
    }
  </style>
</head>
<body>
  <main>
    <header>
      <h1 id="heading">Today's Habits</h1>
      <form class="inline" method="get" action="/">
        <input name="user" placeholder="user id" value="{{USER}}" required />
        <button type="submit">Open</button>
      </form>
    </header>

    <section id="app" data-user="{{USER}}" {{HIDDEN}}>
      <nav role="tablist">
        <button type="button" data-tab="habits" aria-selected="true">Habits</button>
        <button type="button" data-tab="add" aria-selected="false">Add habit</button>
        <button type="button" data-tab="streaks" aria-selected="false">Streaks</button>
      </nav>

      <p class="status" id="status"></p>

      <div id="habits-panel"></div>

      <form id="add-panel" hidden>
        <input id="title" placeholder="Title" required />
        <textarea id="description" placeholder="Description" rows="2"></textarea>
        <select id="frequency">
          <option>Daily</option>
          <option>Weekly</option>
          <option>Monthly</option>
        </select>
        <button type="submit">Add habit</button>
      </form>

      <div id="streaks-panel" hidden></div>
    </section>
  </main>

  <script>
    const root = document.getElementById('app');
    const user = root.dataset.user;
    const base = `/api/users/${encodeURIComponent(user)}`;
    const statusEl = document.getElementById('status');
    const headingEl = document.getElementById('heading');
    const habitsPanel = document.getElementById('habits-panel');
    const addPanel = document.getElementById('add-panel');
    const streaksPanel = document.getElementById('streaks-panel');
    const tabs = Array.from(document.querySelectorAll('nav button'));
    const medals = { gold: '\u{1F947}', silver: '\u{1F948}', bronze: '\u{1F949}' };
    const headings = { habits: "Today's Habits", add: 'Add Habit', streaks: 'Streak' };

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const flash = (message) => {
      setStatus(message, 'ok');
      setTimeout(() => setStatus('', ''), 1200);
    };

    const escapeHtml = (text) =>
      text.replace(/[&<>"']/g, (c) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' })[c]);

    const request = async (method, path, body) => {
      const res = await fetch(`${base}${path}`, {
        method,
        headers: body ? { 'content-type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.status === 204 ? null : res.json();
    };

    const habitCard = (habit) => `
      <article class="card ${habit.completed_this_period ? 'completed' : ''}">
        <h2>${escapeHtml(habit.title)}</h2>
        <p>${escapeHtml(habit.description)}</p>
        <div class="footer">
          <span class="pill">&#128293; ${habit.streak_count} streak</span>
          <span class="pill ${habit.frequency}">${habit.frequency}</span>
        </div>
        <div class="actions">
          <form method="post" action="/users/${encodeURIComponent(user)}/habits/${habit.id}/complete" data-complete="${habit.id}">
            <button class="complete" type="submit" ${habit.completed_this_period ? 'disabled' : ''}>
              ${habit.completed_this_period ? 'Habit has been completed. Good job!' : 'Complete'}
            </button>
          </form>
          <button class="ghost" type="button" data-delete="${habit.id}">Delete</button>
        </div>
      </article>`;

    const loadHabits = async () => {
      const data = await request('GET', '/habits');
      habitsPanel.innerHTML = data.habits.length
        ? data.habits.map(habitCard).join('')
        : '<p>No Habits...</p>';
    };

    const loadStreaks = async () => {
      const data = await request('GET', '/streaks');
      streaksPanel.innerHTML = data.entries.length
        ? data.entries.map((entry) => `
          <article class="card">
            <h2>${entry.medal ? medals[entry.medal] : ''} ${escapeHtml(entry.title)}</h2>
            <p>${escapeHtml(entry.description)}</p>
            <div class="footer">
              <span class="pill">&#128293; Current: ${entry.streak_count}</span>
              <span class="pill">&#127942; Best: ${entry.best_streak}</span>
            </div>
          </article>`).join('')
        : '<p>No Streaks...</p>';
    };

    const setActiveTab = (tab) => {
      tabs.forEach((button) => button.setAttribute('aria-selected', String(button.dataset.tab === tab)));
      habitsPanel.hidden = tab !== 'habits';
      addPanel.hidden = tab !== 'add';
      streaksPanel.hidden = tab !== 'streaks';
      headingEl.textContent = headings[tab];
      const load = tab === 'habits' ? loadHabits : tab === 'streaks' ? loadStreaks : null;
      if (load) {
        load().catch((err) => setStatus(err.message, 'error'));
      }
    };

    tabs.forEach((button) => {
      button.addEventListener('click', () => setActiveTab(button.dataset.tab));
    });

    habitsPanel.addEventListener('submit', (event) => {
      const id = event.target.dataset.complete;
      if (!id) {
        return;
      }
      event.preventDefault();
      request('POST', `/habits/${id}/complete`)
        .then((data) => {
          flash(data.restarted ? 'New streak started!' : 'Habit completed');
          return loadHabits();
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    habitsPanel.addEventListener('click', (event) => {
      const id = event.target.dataset.delete;
      if (!id) {
        return;
      }
      request('DELETE', `/habits/${id}`)
        .then(() => {
          flash('Habit deleted');
          return loadHabits();
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    addPanel.addEventListener('submit', (event) => {
      event.preventDefault();
      setStatus('Adding to habits...', 'info');
      request('POST', '/habits', {
        title: document.getElementById('title').value,
        description: document.getElementById('description').value,
        frequency: document.getElementById('frequency').value
      })
        .then(() => {
          addPanel.reset();
          flash('Habit successfully added!');
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    if (user) {
      setActiveTab('habits');
    }
  </script>
</body>
</html>
"#;
